//! Polygonal meshes (possibly non-manifold) and polylines.
//!
//! Purpose
//! - Provide the read-only mesh the solver marches over: 3D points, cells as
//!   ordered point-id lists (convex polygons or 2-point lines), point→cell
//!   links, and named per-point `f64` arrays.
//! - Provide `Polylines`, the shared representation of boundary curves,
//!   traced paths and centerlines.
//!
//! Why this design
//! - Links are built once at construction; all queries used in the hot loops
//!   (`point_cells`, `cells_with_edge`, `neighbors`) are slice lookups or
//!   short scans over a point's cells.
//! - An edge or point may be shared by any number of cells. Nothing here
//!   assumes manifoldness.
//!
//! Code cross-refs: `eikonal::FastMarching`, `descent::SteepestDescent`.

mod polyline;
mod types;

pub use polyline::Polylines;
pub use types::{CellId, MeshError, PointId, PolyMesh};
