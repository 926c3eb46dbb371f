//! Fast Marching on non-manifold polygonal meshes.
//!
//! Purpose
//! - Solve `|∇T| = F` on a mesh of convex polygons (Voronoi diagram skeleton)
//!   from Dirichlet data on a seed set or on a polyline crossing mesh edges.
//! - Produce the arrival-time field that the line tracer descends.
//!
//! Why this design
//! - One `FastMarching` value owns `T`, the per-point status and the heap for
//!   the whole run; callers see the solution only through accessors or after
//!   `into_solution`.
//! - Polygons are handled by virtual fan triangulation around the point being
//!   updated (`update::fan`); every triangle is solved with the planar
//!   two-vertex update of Kimmel–Sethian, with 1D edge updates as fallback.
//! - Internally unreached points hold `+∞` and `Status::Far`. The exported
//!   array zeroes them, which is what downstream consumers expect.
//!
//! References
//! - R. Kimmel, J. A. Sethian, "Computing geodesic paths on manifolds", PNAS 1998.
//! - J. A. Sethian, "Level Set Methods and Fast Marching Methods", 1999.
//! - Code cross-refs: `heap::MinHeap`, `mesh::PolyMesh`, `descent::LineTracer`.

mod quadratic;
mod solver;
mod types;
mod update;

pub use quadratic::{solve_quadratic, QuadraticRoots};
pub use solver::{solve_eikonal, FastMarching};
pub use types::{
    Boundary, EikonalError, EikonalSolution, FastMarchingCfg, PolylineBoundary, SeedBoundary,
    SpeedModel, Status, StopCriteria, DEFAULT_SOLUTION_ARRAY_NAME,
};
pub use update::{fan, Stencil};

#[cfg(test)]
mod tests;
