//! Centerline core: Fast Marching on non-manifold polygonal meshes and
//! steepest-descent path tracing.
//!
//! Layout
//! - `mesh`: polygonal mesh with point→cell links and named point arrays; polylines.
//! - `heap`: indexed min-heap keyed by an external value array.
//! - `eikonal`: Kimmel–Sethian Fast Marching with seed or polyline boundaries.
//! - `descent`: discrete steepest descent and the line tracer.
//! - `centerlines`: cost `1/R` → arrival time → backtraced centerlines.
//! - `meshgen`: deterministic test meshes (grids, disks, ribbons, chains).
//!
//! API Policy
//! - The crate is consumed by the CLI and the Python bindings in this
//!   workspace. `api` is the curated surface; module paths may move.

mod cfg;

pub mod api;
pub mod centerlines;
pub mod descent;
pub mod eikonal;
pub mod heap;
pub mod mesh;
pub mod meshgen;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector3 as Vec3;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::centerlines::{extract_centerlines, CenterlineParams, Centerlines};
    pub use crate::descent::{trace_paths, Direction, TracerCfg};
    pub use crate::eikonal::{solve_eikonal, Boundary, FastMarchingCfg, SpeedModel};
    pub use crate::mesh::{PointId, PolyMesh, Polylines};
    pub use nalgebra::Vector3 as Vec3;
}
