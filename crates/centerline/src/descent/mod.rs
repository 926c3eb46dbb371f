//! Steepest-descent backtracing on the 1-skeleton of a polygonal mesh.
//!
//! Purpose
//! - Follow a scalar field (usually a Fast Marching arrival time) downhill
//!   from seed points, moving between points on cell edges, until a target,
//!   an existing path, or a stall is reached.
//!
//! Why this design
//! - `SteepestDescent` is a pure query over a borrowed mesh and field; the
//!   `LineTracer` owns the append-only output so later paths can merge into
//!   earlier ones at T-junctions.
//! - Locations are `EdgePoint`s `(edge, s)`, a degenerate edge `(v, v)` being
//!   the vertex `v`. Candidate moves sample each cell edge uniformly, so the
//!   descent is a discrete approximation of the gradient flow.
//! - Tracing failures end the path with a `TraceOutcome` and a `tracing`
//!   warning; only configuration problems are errors.
//!
//! Code cross-refs: `eikonal::FastMarching`, `centerlines::extract_centerlines`.

mod engine;
mod tracer;
mod types;

pub use engine::SteepestDescent;
pub use tracer::{trace_paths, LineTracer};
pub use types::{
    Descent, Direction, EdgePoint, TraceError, TraceOutcome, TracedPaths, TracerCfg,
    DEFAULT_DATA_ARRAY_NAME, DEFAULT_SUBDIVISIONS,
};
