//! Curated API for the CLI and the Python bindings.
//!
//! Prefer these re-exports over deep module paths.

// Mesh model
pub use crate::mesh::{CellId, MeshError, PointId, PolyMesh, Polylines};
// Priority queue
pub use crate::heap::{HeapError, MinHeap};
// Fast Marching
pub use crate::eikonal::{
    solve_eikonal, Boundary, EikonalError, EikonalSolution, FastMarching, FastMarchingCfg,
    PolylineBoundary, SeedBoundary, SpeedModel, Status, StopCriteria, DEFAULT_SOLUTION_ARRAY_NAME,
};
// Descent and tracing
pub use crate::descent::{
    trace_paths, Direction, EdgePoint, LineTracer, SteepestDescent, TraceError, TraceOutcome,
    TracedPaths, TracerCfg,
};
// Centerlines
pub use crate::centerlines::{
    extract_centerlines, resample, CenterlineError, CenterlineParams, Centerlines, CostFunction,
    EndPoints, COST_FUNCTION_ARRAY_NAME, DEFAULT_RADIUS_ARRAY_NAME, EIKONAL_SOLUTION_ARRAY_NAME,
};
// Generators
pub use crate::meshgen::{chain, disk, grid, ribbon, DiskCfg, GridCfg, RibbonCfg};
