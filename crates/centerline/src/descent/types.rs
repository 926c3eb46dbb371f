//! Locations on mesh edges, descent results, tracer options and errors.

use std::fmt;

use nalgebra::Vector3;

use crate::cfg::DOUBLE_TOL;
use crate::mesh::{PointId, PolyMesh, Polylines};

/// Default number of samples per cell edge.
pub const DEFAULT_SUBDIVISIONS: usize = 250;
/// Name of the path data array when none is configured (the descent field is carried).
pub const DEFAULT_DATA_ARRAY_NAME: &str = "DataArray";

/// Which way the tracer walks the scalar field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Downward,
    Upward,
}

impl Direction {
    /// `+1` for downward, `-1` for upward.
    #[inline]
    pub fn factor(self) -> f64 {
        match self {
            Direction::Downward => 1.0,
            Direction::Upward => -1.0,
        }
    }
}

/// Point on the segment `edge.0 → edge.1` at parameter `s ∈ [0, 1)`.
/// A degenerate edge `(v, v)` is the mesh point `v` itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePoint {
    pub edge: (PointId, PointId),
    pub s: f64,
}

impl EdgePoint {
    #[inline]
    pub fn new(p0: PointId, p1: PointId, s: f64) -> Self {
        Self { edge: (p0, p1), s }
    }

    #[inline]
    pub fn vertex(p: PointId) -> Self {
        Self { edge: (p, p), s: 0.0 }
    }

    #[inline]
    pub fn is_vertex(&self) -> bool {
        self.edge.0 == self.edge.1
    }

    #[inline]
    pub fn position(&self, mesh: &PolyMesh) -> Vector3<f64> {
        mesh.lerp(self.edge.0, self.edge.1, self.s)
    }

    /// Linear interpolation of a point array at this location.
    #[inline]
    pub fn interpolate(&self, values: &[f64]) -> f64 {
        values[self.edge.0] * (1.0 - self.s) + values[self.edge.1] * self.s
    }

    /// Same edge in either orientation.
    #[inline]
    pub fn shares_edge(&self, other: &EdgePoint) -> bool {
        self.edge == other.edge || self.edge == (other.edge.1, other.edge.0)
    }

    /// Whether both describe the same location (reversed edges mirror `s`).
    pub fn coincides(&self, other: &EdgePoint) -> bool {
        if self.edge == other.edge {
            (self.s - other.s).abs() < DOUBLE_TOL
        } else if self.edge == (other.edge.1, other.edge.0) {
            (1.0 - other.s - self.s).abs() < DOUBLE_TOL
        } else {
            false
        }
    }
}

/// Best move found from a location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Descent {
    pub target: EdgePoint,
    /// `-(φ(target) - φ(here)) / |target - here|`; 0 for coincident points.
    pub value: f64,
    pub length: f64,
}

/// Line tracer options.
#[derive(Clone, Debug)]
pub struct TracerCfg {
    pub direction: Direction,
    pub subdivisions: usize,
    /// Stop when a path touches an edge with a target endpoint; also disables the stall check.
    pub stop_on_targets: bool,
    /// End a path where it lands on an edge already crossed by an emitted point.
    pub merge_paths: bool,
    /// Absolute merge distance; values below `1e-12` are raised to it.
    pub merge_tolerance: f64,
    /// Point array carried along the paths; `None` carries the descent field.
    pub data_array: Option<String>,
    pub max_iterations: usize,
}

impl Default for TracerCfg {
    fn default() -> Self {
        Self {
            direction: Direction::Downward,
            subdivisions: DEFAULT_SUBDIVISIONS,
            stop_on_targets: false,
            merge_paths: false,
            merge_tolerance: DOUBLE_TOL,
            data_array: None,
            max_iterations: 100_000,
        }
    }
}

/// How one backtrace ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceOutcome {
    HitTarget(PointId),
    /// Joined the emitted point with this id.
    Merged { into: usize },
    /// No further descent (only when not stopping on targets).
    Stalled,
    NoDescentEdge,
    /// Stepped back onto the location of two steps earlier.
    Degenerate,
    IterationLimit,
}

/// Traced paths with per-point data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TracedPaths {
    /// Emitted points; one line per seed, in seed order.
    pub polylines: Polylines,
    pub data_name: String,
    pub data: Vec<f64>,
    pub edges: Vec<(PointId, PointId)>,
    pub pcoords: Vec<f64>,
    /// Target reached by each path that hit one, in seed order.
    pub hit_targets: Vec<PointId>,
    pub outcomes: Vec<TraceOutcome>,
}

impl TracedPaths {
    /// Whether every path ended on a target.
    pub fn all_hit(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, TraceOutcome::HitTarget(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceError {
    MissingDescentArray { name: String },
    MissingDataArray { name: String },
    EmptySeeds,
    SeedOutOfRange { id: PointId, num_points: usize },
    TargetOutOfRange { id: PointId, num_points: usize },
    ZeroSubdivisions,
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDescentArray { name } => {
                write!(f, "descent array {name:?} does not exist")
            }
            Self::MissingDataArray { name } => write!(f, "line data array {name:?} does not exist"),
            Self::EmptySeeds => write!(f, "empty seed list"),
            Self::SeedOutOfRange { id, num_points } => {
                write!(f, "seed id {id} exceeds number of points {num_points}")
            }
            Self::TargetOutOfRange { id, num_points } => {
                write!(f, "target id {id} exceeds number of points {num_points}")
            }
            Self::ZeroSubdivisions => write!(f, "edge subdivisions must be positive"),
        }
    }
}

impl std::error::Error for TraceError {}
