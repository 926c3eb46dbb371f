//! Backtracing paths from seeds by repeated steepest descent.

use nalgebra::Vector3;

use super::engine::SteepestDescent;
use super::types::{
    EdgePoint, TraceError, TraceOutcome, TracedPaths, TracerCfg, DEFAULT_DATA_ARRAY_NAME,
};
use crate::cfg::DOUBLE_TOL;
use crate::mesh::{PointId, PolyMesh};

/// Traces one polyline per seed into a shared output.
///
/// Emitted points are append-only, so later paths can merge into earlier
/// ones (and into their own past).
#[derive(Debug)]
pub struct LineTracer<'m> {
    mesh: &'m PolyMesh,
    engine: SteepestDescent<'m>,
    data: &'m [f64],
    targets: Vec<PointId>,
    cfg: TracerCfg,
    paths: TracedPaths,
}

impl<'m> LineTracer<'m> {
    /// Bind the tracer to a mesh, a descent field and a target set.
    pub fn new(
        mesh: &'m PolyMesh,
        descent_array: &str,
        targets: Vec<PointId>,
        cfg: TracerCfg,
    ) -> Result<Self, TraceError> {
        let engine = SteepestDescent::new(mesh, descent_array, cfg.direction)?
            .with_subdivisions(cfg.subdivisions)?;
        let num_points = mesh.num_points();
        if let Some(&id) = targets.iter().find(|&&id| id >= num_points) {
            return Err(TraceError::TargetOutOfRange { id, num_points });
        }
        let (data_name, data) = match &cfg.data_array {
            Some(name) => (
                name.clone(),
                mesh.point_array(name)
                    .ok_or_else(|| TraceError::MissingDataArray { name: name.clone() })?,
            ),
            None => (DEFAULT_DATA_ARRAY_NAME.to_string(), engine.field()),
        };
        let cfg = TracerCfg {
            merge_tolerance: cfg.merge_tolerance.max(DOUBLE_TOL),
            ..cfg
        };
        Ok(Self {
            mesh,
            engine,
            data,
            targets,
            cfg,
            paths: TracedPaths {
                data_name,
                ..TracedPaths::default()
            },
        })
    }

    #[inline]
    pub fn paths(&self) -> &TracedPaths {
        &self.paths
    }

    pub fn into_paths(self) -> TracedPaths {
        self.paths
    }

    /// Trace one path from `seed` and append it to the output.
    pub fn backtrace(&mut self, seed: PointId) -> Result<TraceOutcome, TraceError> {
        let num_points = self.mesh.num_points();
        if seed >= num_points {
            return Err(TraceError::SeedOutOfRange {
                id: seed,
                num_points,
            });
        }
        let factor = self.cfg.direction.factor();

        let mut current = EdgePoint::vertex(seed);
        let mut here = self.mesh.point(seed);
        let mut line = vec![self.emit(current, here)];
        let mut previous2: Option<EdgePoint> = None;
        let mut iterations = 0usize;

        let outcome = loop {
            if self.cfg.stop_on_targets {
                if let Some(target) = self.target_on(&current) {
                    let end = self.mesh.point(target);
                    if (here - end).norm_squared() > DOUBLE_TOL {
                        line.push(self.emit(EdgePoint::vertex(target), end));
                    }
                    self.paths.hit_targets.push(target);
                    break TraceOutcome::HitTarget(target);
                }
            }
            if iterations >= self.cfg.max_iterations {
                tracing::warn!(seed, iterations, "iteration limit reached; target not reached");
                break TraceOutcome::IterationLimit;
            }

            let Some(descent) = self.engine.steepest_descent(&current) else {
                tracing::warn!(seed, "no steepest descent edge; target not reached");
                break TraceOutcome::NoDescentEdge;
            };
            if factor * descent.value < DOUBLE_TOL && !self.cfg.stop_on_targets {
                tracing::warn!(seed, "descent stalled; target not reached");
                break TraceOutcome::Stalled;
            }

            let next = descent.target;
            if iterations > 0 && previous2.is_some_and(|p| next.coincides(&p)) {
                tracing::warn!(seed, "degenerate descent; target not reached");
                break TraceOutcome::Degenerate;
            }
            let pos = next.position(self.mesh);

            if self.cfg.merge_paths {
                if let Some(into) = self.merge_candidate(&next, pos) {
                    line.push(into);
                    break TraceOutcome::Merged { into };
                }
            }

            line.push(self.emit(next, pos));
            previous2 = Some(current);
            current = next;
            here = pos;
            iterations += 1;
        };

        self.paths.polylines.push_line(line);
        self.paths.outcomes.push(outcome);
        Ok(outcome)
    }

    fn target_on(&self, at: &EdgePoint) -> Option<PointId> {
        [at.edge.0, at.edge.1]
            .into_iter()
            .find(|p| self.targets.contains(p))
    }

    /// Newest emitted point on the same edge within the merge tolerance.
    fn merge_candidate(&self, at: &EdgePoint, pos: Vector3<f64>) -> Option<usize> {
        let out = &self.paths;
        (0..out.polylines.num_points()).rev().find(|&j| {
            let emitted = EdgePoint::new(out.edges[j].0, out.edges[j].1, out.pcoords[j]);
            emitted.shares_edge(at)
                && (out.polylines.points[j] - pos).norm() <= self.cfg.merge_tolerance
        })
    }

    fn emit(&mut self, at: EdgePoint, pos: Vector3<f64>) -> usize {
        let id = self.paths.polylines.push_point(pos);
        self.paths.data.push(at.interpolate(self.data));
        self.paths.edges.push(at.edge);
        self.paths.pcoords.push(at.s);
        id
    }
}

/// Trace every seed in order.
pub fn trace_paths(
    mesh: &PolyMesh,
    descent_array: &str,
    seeds: &[PointId],
    targets: &[PointId],
    cfg: TracerCfg,
) -> Result<TracedPaths, TraceError> {
    if seeds.is_empty() {
        return Err(TraceError::EmptySeeds);
    }
    let num_points = mesh.num_points();
    if let Some(&id) = seeds.iter().find(|&&id| id >= num_points) {
        return Err(TraceError::SeedOutOfRange { id, num_points });
    }
    let mut tracer = LineTracer::new(mesh, descent_array, targets.to_vec(), cfg)?;
    for &seed in seeds {
        tracer.backtrace(seed)?;
    }
    let paths = tracer.into_paths();
    tracing::debug!(
        lines = paths.polylines.num_lines(),
        points = paths.polylines.num_points(),
        hit = paths.hit_targets.len(),
        "paths traced"
    );
    Ok(paths)
}
