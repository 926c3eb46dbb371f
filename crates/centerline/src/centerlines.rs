//! Centerline extraction on a Voronoi diagram with a radius field.
//!
//! Purpose
//! - Turn a Voronoi mesh carrying maximum inscribed sphere radii into
//!   source→target centerlines: cost `F(R)`, Fast Marching from the sources,
//!   steepest-descent backtracing from the targets.
//!
//! Pipeline
//! - `F = 1/R` (or `R^-p`) is stored as `"CostFunctionArray"`.
//! - The arrival time from the sources is stored as `"EikonalSolutionArray"`.
//! - One path per target, stopping on the first source touched, carrying `R`.
//! - Optional end points (e.g. inlet/outlet centers) are prepended/appended
//!   once every target has reached a source; optional arc-length resampling;
//!   finally every line is reversed to run source → target.
//!
//! References
//! - L. Antiga, "Patient-specific modeling of geometry and blood flow in large
//!   arteries", PhD thesis, 2002 (centerlines as weighted geodesics on the
//!   Voronoi diagram).
//! - Code cross-refs: `eikonal::solve_eikonal`, `descent::trace_paths`.

use std::fmt;

use nalgebra::Vector3;

use crate::cfg::LARGE_DOUBLE;
use crate::descent::{trace_paths, TraceError, TracerCfg};
use crate::eikonal::{
    solve_eikonal, Boundary, EikonalError, EikonalSolution, FastMarchingCfg, SpeedModel,
};
use crate::mesh::{MeshError, PointId, PolyMesh, Polylines};

pub const DEFAULT_RADIUS_ARRAY_NAME: &str = "MaximumInscribedSphereRadius";
pub const COST_FUNCTION_ARRAY_NAME: &str = "CostFunctionArray";
pub const EIKONAL_SOLUTION_ARRAY_NAME: &str = "EikonalSolutionArray";

/// Cost as a function of the inscribed radius.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CostFunction {
    /// `1 / R`
    #[default]
    InverseRadius,
    /// `R^-p`
    InversePower(f64),
}

impl CostFunction {
    /// Cost at radius `r`; non-positive radii get the large sentinel.
    pub fn eval(&self, r: f64) -> f64 {
        if r <= 0.0 {
            return LARGE_DOUBLE;
        }
        let c = match *self {
            CostFunction::InverseRadius => 1.0 / r,
            CostFunction::InversePower(p) => r.powf(-p),
        };
        if c.is_finite() {
            c
        } else {
            LARGE_DOUBLE
        }
    }
}

/// Positions attached to both ends of every centerline, one per source and
/// one per target (in the order the ids are given).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EndPoints {
    pub sources: Vec<Vector3<f64>>,
    pub targets: Vec<Vector3<f64>>,
}

#[derive(Clone, Debug)]
pub struct CenterlineParams {
    pub radius_array: String,
    pub cost: CostFunction,
    pub end_points: Option<EndPoints>,
    /// Arc-length step; `None` keeps the traced points.
    pub resampling_step: Option<f64>,
}

impl Default for CenterlineParams {
    fn default() -> Self {
        Self {
            radius_array: DEFAULT_RADIUS_ARRAY_NAME.to_string(),
            cost: CostFunction::default(),
            end_points: None,
            resampling_step: None,
        }
    }
}

/// Extracted centerlines.
#[derive(Clone, Debug)]
pub struct Centerlines {
    /// One line per target, running source → target.
    pub lines: Polylines,
    pub radius_name: String,
    /// Radius per point of `lines`.
    pub radius: Vec<f64>,
    /// Source reached by each target, in target order (complete only when every target succeeded).
    pub hit_targets: Vec<PointId>,
    /// Arrival times on the Voronoi points.
    pub eikonal: EikonalSolution,
}

impl Centerlines {
    pub fn line_radius(&self, k: usize) -> Vec<f64> {
        self.lines.lines[k].iter().map(|&id| self.radius[id]).collect()
    }

    pub fn all_targets_hit(&self, num_targets: usize) -> bool {
        self.hit_targets.len() == num_targets
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CenterlineError {
    MissingRadiusArray { name: String },
    NoSources,
    NoTargets,
    EndPointCount { sources: usize, targets: usize },
    InvalidResamplingStep { value: f64 },
    Mesh(MeshError),
    Eikonal(EikonalError),
    Trace(TraceError),
}

impl fmt::Display for CenterlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRadiusArray { name } => write!(f, "radius array {name:?} does not exist"),
            Self::NoSources => write!(f, "no source ids"),
            Self::NoTargets => write!(f, "no target ids"),
            Self::EndPointCount { sources, targets } => write!(
                f,
                "end points must match ids ({sources} sources, {targets} targets expected)"
            ),
            Self::InvalidResamplingStep { value } => {
                write!(f, "resampling step must be finite and > 0 (got {value})")
            }
            Self::Mesh(err) => write!(f, "mesh: {err}"),
            Self::Eikonal(err) => write!(f, "eikonal: {err}"),
            Self::Trace(err) => write!(f, "trace: {err}"),
        }
    }
}

impl std::error::Error for CenterlineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mesh(err) => Some(err),
            Self::Eikonal(err) => Some(err),
            Self::Trace(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MeshError> for CenterlineError {
    fn from(err: MeshError) -> Self {
        Self::Mesh(err)
    }
}

impl From<EikonalError> for CenterlineError {
    fn from(err: EikonalError) -> Self {
        Self::Eikonal(err)
    }
}

impl From<TraceError> for CenterlineError {
    fn from(err: TraceError) -> Self {
        Self::Trace(err)
    }
}

/// Run the full pipeline on `voronoi` from `sources` to `targets`.
pub fn extract_centerlines(
    voronoi: &PolyMesh,
    sources: &[PointId],
    targets: &[PointId],
    params: &CenterlineParams,
) -> Result<Centerlines, CenterlineError> {
    if sources.is_empty() {
        return Err(CenterlineError::NoSources);
    }
    if targets.is_empty() {
        return Err(CenterlineError::NoTargets);
    }
    if let Some(ends) = &params.end_points {
        if ends.sources.len() != sources.len() || ends.targets.len() != targets.len() {
            return Err(CenterlineError::EndPointCount {
                sources: sources.len(),
                targets: targets.len(),
            });
        }
    }
    if let Some(step) = params.resampling_step {
        if !step.is_finite() || step <= 0.0 {
            return Err(CenterlineError::InvalidResamplingStep { value: step });
        }
    }
    let radius = voronoi
        .point_array(&params.radius_array)
        .ok_or_else(|| CenterlineError::MissingRadiusArray {
            name: params.radius_array.clone(),
        })?;

    let cost: Vec<f64> = radius.iter().map(|&r| params.cost.eval(r)).collect();
    let mut mesh = voronoi
        .clone()
        .with_point_array(COST_FUNCTION_ARRAY_NAME, cost)?;

    let fm_cfg = FastMarchingCfg {
        speed: SpeedModel::CostArray(COST_FUNCTION_ARRAY_NAME.to_string()),
        solution_array_name: EIKONAL_SOLUTION_ARRAY_NAME.to_string(),
        ..FastMarchingCfg::default()
    };
    let eikonal = solve_eikonal(&mesh, fm_cfg, &Boundary::from_seeds(sources))?;
    mesh.add_point_array(eikonal.name.clone(), eikonal.values.clone())?;

    let tracer_cfg = TracerCfg {
        stop_on_targets: true,
        merge_paths: false,
        data_array: Some(params.radius_array.clone()),
        ..TracerCfg::default()
    };
    let paths = trace_paths(&mesh, EIKONAL_SOLUTION_ARRAY_NAME, targets, sources, tracer_cfg)?;

    let mut lines = paths.polylines;
    let mut radius = paths.data;
    let hit_targets = paths.hit_targets;

    if let Some(ends) = &params.end_points {
        if hit_targets.len() == targets.len() {
            append_end_points(&mut lines, &mut radius, ends, sources, &hit_targets);
        } else {
            tracing::warn!(
                hit = hit_targets.len(),
                targets = targets.len(),
                "not every target reached a source; end points not appended"
            );
        }
    }
    if let Some(step) = params.resampling_step {
        (lines, radius) = resample(&lines, &radius, step);
    }
    lines.reverse_lines();

    tracing::debug!(
        lines = lines.num_lines(),
        points = lines.num_points(),
        "centerlines extracted"
    );
    Ok(Centerlines {
        lines,
        radius_name: params.radius_array.clone(),
        radius,
        hit_targets,
        eikonal,
    })
}

/// Prepend the target end point and append the end point of the source hit.
/// Radii are copied from the adjacent path points.
fn append_end_points(
    lines: &mut Polylines,
    radius: &mut Vec<f64>,
    ends: &EndPoints,
    sources: &[PointId],
    hit_targets: &[PointId],
) {
    for k in 0..lines.num_lines() {
        let ids = lines.lines[k].clone();
        let (Some(&first), Some(&last)) = (ids.first(), ids.last()) else {
            continue;
        };
        let Some(source_idx) = sources.iter().position(|&s| s == hit_targets[k]) else {
            continue;
        };
        let head = lines.push_point(ends.targets[k]);
        radius.push(radius[first]);
        let tail = lines.push_point(ends.sources[source_idx]);
        radius.push(radius[last]);

        let mut complete = Vec::with_capacity(ids.len() + 2);
        complete.push(head);
        complete.extend_from_slice(&ids);
        complete.push(tail);
        lines.lines[k] = complete;
    }
}

/// Resample every line at uniform arc length `step`, keeping both ends.
/// Points are not shared between lines in the result.
pub fn resample(lines: &Polylines, values: &[f64], step: f64) -> (Polylines, Vec<f64>) {
    let mut out = Polylines::default();
    let mut out_values = Vec::new();
    for ids in &lines.lines {
        let mut line = Vec::new();
        let Some(&first) = ids.first() else {
            out.push_line(line);
            continue;
        };
        line.push(out.push_point(lines.points[first]));
        out_values.push(values[first]);

        let total: f64 = ids
            .windows(2)
            .map(|w| (lines.points[w[1]] - lines.points[w[0]]).norm())
            .sum();
        let eps = 1e-9 * step;
        let mut k = 1usize;
        let mut walked = 0.0;
        for w in ids.windows(2) {
            let (a, b) = (lines.points[w[0]], lines.points[w[1]]);
            let len = (b - a).norm();
            while len > 0.0 {
                let at = k as f64 * step;
                if at > walked + len || at >= total - eps {
                    break;
                }
                let t = (at - walked) / len;
                line.push(out.push_point(a + (b - a) * t));
                out_values.push(values[w[0]] + (values[w[1]] - values[w[0]]) * t);
                k += 1;
            }
            walked += len;
        }

        if ids.len() > 1 {
            let last = ids[ids.len() - 1];
            line.push(out.push_point(lines.points[last]));
            out_values.push(values[last]);
        }
        out.push_line(line);
    }
    (out, out_values)
}
