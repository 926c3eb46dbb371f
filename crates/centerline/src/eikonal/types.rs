//! Configuration, boundary conditions, status and errors for Fast Marching.

use std::fmt;

use crate::heap::HeapError;
use crate::mesh::{MeshError, PointId, PolyMesh, Polylines};

/// Name given to the exported arrival-time array unless configured otherwise.
pub const DEFAULT_SOLUTION_ARRAY_NAME: &str = "EikonalSolution";

/// Per-point marching state. Transitions only go `Far → Considered → Accepted`.
///
/// A point popped without ever receiving a finite estimate stays `Considered`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Far,
    Considered,
    Accepted,
}

/// Where the inverse speed `F` comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum SpeedModel {
    /// `F = 1` everywhere (geodesic distance).
    Unit,
    /// `F` read from the named point array of the mesh.
    CostArray(String),
}

/// Early-termination criteria, checked after each accepted point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopCriteria {
    /// Stop once an accepted value exceeds this travel time.
    pub travel_time: Option<f64>,
    /// Stop once this many points (boundary points included) are accepted.
    pub number_of_points: Option<usize>,
    /// Stop right after this point is accepted.
    pub seed_id: Option<PointId>,
}

/// Solver options.
#[derive(Clone, Debug)]
pub struct FastMarchingCfg {
    pub speed: SpeedModel,
    /// Added to `F` in triangle updates; penalizes path length.
    pub regularization: f64,
    pub stop: StopCriteria,
    /// Allow a triangle with one accepted base vertex to fall back to an edge update.
    pub allow_line_update: bool,
    /// Allow that fallback also while the missing base vertex is Considered.
    pub update_from_considered: bool,
    /// Sweeps of neighborhood updates over the boundary before marching.
    pub warmup_passes: usize,
    /// Also try the larger root when the smaller one fails the causality test.
    pub search_larger_root: bool,
    pub solution_array_name: String,
}

impl Default for FastMarchingCfg {
    fn default() -> Self {
        Self {
            speed: SpeedModel::Unit,
            regularization: 0.0,
            stop: StopCriteria::default(),
            allow_line_update: true,
            update_from_considered: true,
            warmup_passes: 3,
            search_larger_root: false,
            solution_array_name: DEFAULT_SOLUTION_ARRAY_NAME.to_string(),
        }
    }
}

/// Seeds pinned to `T = 0`, or to the values of an initialization array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeedBoundary {
    pub ids: Vec<PointId>,
    pub initialization_array: Option<String>,
}

/// Zero level set given as polylines crossing mesh edges.
///
/// `intersected_edges[i]` is the mesh edge crossed by boundary point `i`;
/// a pair `(a, a)` means the boundary point sits on mesh point `a`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolylineBoundary {
    pub polylines: Polylines,
    pub intersected_edges: Vec<(PointId, PointId)>,
}

/// Boundary conditions; at least one kind must be present.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Boundary {
    pub seeds: Option<SeedBoundary>,
    pub polyline: Option<PolylineBoundary>,
}

impl Boundary {
    pub fn from_seeds(ids: impl Into<Vec<PointId>>) -> Self {
        Self {
            seeds: Some(SeedBoundary {
                ids: ids.into(),
                initialization_array: None,
            }),
            polyline: None,
        }
    }

    pub fn from_polyline(polyline: PolylineBoundary) -> Self {
        Self {
            seeds: None,
            polyline: Some(polyline),
        }
    }
}

/// Configuration and invariant errors. Raised before any output is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EikonalError {
    MissingCostArray { name: String },
    MissingInitializationArray { name: String },
    NoBoundaryConditions,
    EmptySeeds,
    SeedOutOfRange { id: PointId, num_points: usize },
    IntersectedEdgesLength { expected: usize, got: usize },
    EdgeOutOfRange { edge: (PointId, PointId), num_points: usize },
    PolylinePointOutOfRange { line: usize, id: usize, num_points: usize },
    InvalidRegularization { value: f64 },
    Heap(HeapError),
    Mesh(MeshError),
}

impl fmt::Display for EikonalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCostArray { name } => {
                write!(f, "cost function array {name:?} does not exist")
            }
            Self::MissingInitializationArray { name } => {
                write!(f, "initialization array {name:?} does not exist")
            }
            Self::NoBoundaryConditions => write!(f, "no boundary conditions activated"),
            Self::EmptySeeds => write!(f, "seed boundary conditions without seeds"),
            Self::SeedOutOfRange { id, num_points } => {
                write!(f, "seed id {id} exceeds number of points {num_points}")
            }
            Self::IntersectedEdgesLength { expected, got } => write!(
                f,
                "intersected edges has {got} entries, boundary polylines have {expected} points"
            ),
            Self::EdgeOutOfRange { edge, num_points } => write!(
                f,
                "intersected edge {edge:?} exceeds number of points {num_points}"
            ),
            Self::PolylinePointOutOfRange {
                line,
                id,
                num_points,
            } => write!(
                f,
                "boundary polyline {line} references point {id}, polylines have {num_points} points"
            ),
            Self::InvalidRegularization { value } => {
                write!(f, "regularization must be finite and >= 0 (got {value})")
            }
            Self::Heap(err) => write!(f, "heap: {err}"),
            Self::Mesh(err) => write!(f, "mesh: {err}"),
        }
    }
}

impl std::error::Error for EikonalError {}

impl From<HeapError> for EikonalError {
    fn from(err: HeapError) -> Self {
        Self::Heap(err)
    }
}

impl From<MeshError> for EikonalError {
    fn from(err: MeshError) -> Self {
        Self::Mesh(err)
    }
}

/// Exported arrival times (unreached points zeroed) plus run statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct EikonalSolution {
    pub name: String,
    pub values: Vec<f64>,
    pub accepted: usize,
    pub unreached: usize,
}

impl EikonalSolution {
    /// Copy of `mesh` with the solution attached under `self.name`.
    pub fn attach_to(&self, mesh: &PolyMesh) -> Result<PolyMesh, MeshError> {
        mesh.clone()
            .with_point_array(self.name.clone(), self.values.clone())
    }
}
