//! Fast Marching driver: initialization, propagation, export.

use nalgebra::Vector3;

use super::types::{
    Boundary, EikonalError, EikonalSolution, FastMarchingCfg, PolylineBoundary, SeedBoundary,
    SpeedModel, Status,
};
use super::update::{fan, line_update, triangle_update, Stencil, Support};
use crate::cfg::DOUBLE_TOL;
use crate::heap::MinHeap;
use crate::mesh::{PointId, PolyMesh};

/// Fast Marching state over one mesh.
///
/// Construction validates the configuration and runs the initialization
/// (boundary points accepted, warm-up passes done). Points are then accepted
/// one at a time by `step` or all at once by `propagate`.
#[derive(Debug)]
pub struct FastMarching<'m> {
    mesh: &'m PolyMesh,
    cfg: FastMarchingCfg,
    cost: Option<&'m [f64]>,
    t: Vec<f64>,
    status: Vec<Status>,
    heap: MinHeap,
    accepted: usize,
    allow_line_update: bool,
}

impl<'m> FastMarching<'m> {
    pub fn new(
        mesh: &'m PolyMesh,
        cfg: FastMarchingCfg,
        boundary: &Boundary,
    ) -> Result<Self, EikonalError> {
        let n = mesh.num_points();
        if !cfg.regularization.is_finite() || cfg.regularization < 0.0 {
            return Err(EikonalError::InvalidRegularization {
                value: cfg.regularization,
            });
        }
        let cost = match &cfg.speed {
            SpeedModel::Unit => None,
            SpeedModel::CostArray(name) => Some(
                mesh.point_array(name)
                    .ok_or_else(|| EikonalError::MissingCostArray { name: name.clone() })?,
            ),
        };
        if boundary.seeds.is_none() && boundary.polyline.is_none() {
            return Err(EikonalError::NoBoundaryConditions);
        }
        let init = match &boundary.seeds {
            Some(seeds) => validate_seeds(mesh, seeds)?,
            None => None,
        };
        if let Some(polyline) = &boundary.polyline {
            validate_polyline(n, polyline)?;
            if cost.is_some() {
                tracing::warn!(
                    "polyline boundary initialization can be inaccurate without unit speed"
                );
            }
        }

        let allow_line_update = cfg.allow_line_update;
        let mut heap = MinHeap::new();
        heap.initialize(n);
        let mut fm = Self {
            mesh,
            cfg,
            cost,
            t: vec![f64::INFINITY; n],
            status: vec![Status::Far; n],
            heap,
            accepted: 0,
            allow_line_update,
        };
        fm.init_propagation(boundary.seeds.as_ref(), init, boundary.polyline.as_ref());
        Ok(fm)
    }

    fn init_propagation(
        &mut self,
        seeds: Option<&SeedBoundary>,
        init: Option<&[f64]>,
        polyline: Option<&PolylineBoundary>,
    ) {
        let mut boundary: Vec<PointId> = Vec::new();

        if let Some(seeds) = seeds {
            for &p in &seeds.ids {
                push_unique(&mut boundary, p);
                self.t[p] = init.map_or(0.0, |values| values[p]);
            }
        }

        if let Some(pb) = polyline {
            for (i, &(a, b)) in pb.intersected_edges.iter().enumerate() {
                let cells = if a == b {
                    push_unique(&mut boundary, a);
                    self.t[a] = 0.0;
                    self.mesh.point_cells(a).to_vec()
                } else {
                    push_unique(&mut boundary, a);
                    push_unique(&mut boundary, b);
                    self.mesh.cells_with_edge(a, b)
                };
                let lines = pb.polylines.lines_through(i);
                for c in cells {
                    for &p in self.mesh.cell(c) {
                        push_unique(&mut boundary, p);
                        let x = self.mesh.point(p);
                        for &k in &lines {
                            if let Some(d) = pb.polylines.distance_to_line(x, k) {
                                if d - self.t[p] < -DOUBLE_TOL {
                                    self.t[p] = d;
                                }
                            }
                        }
                    }
                }
            }
        }

        for &p in &boundary {
            self.status[p] = Status::Accepted;
            self.accepted += 1;
        }

        self.allow_line_update = true;
        for _ in 0..self.cfg.warmup_passes {
            for &p in &boundary {
                self.update_neighborhood(p);
            }
        }
        self.allow_line_update = self.cfg.allow_line_update;

        tracing::debug!(
            boundary = boundary.len(),
            considered = self.heap.len(),
            "fast marching initialized"
        );
    }

    /// Accept the next Considered point and update its neighborhood.
    ///
    /// Returns `None` once no reachable Considered point remains.
    pub fn step(&mut self) -> Option<PointId> {
        loop {
            let p = match self.heap.pop_min(&self.t) {
                Ok(Some(p)) => p,
                Ok(None) => return None,
                Err(err) => {
                    tracing::error!(%err, "heap invariant violated");
                    return None;
                }
            };
            if !self.t[p].is_finite() {
                // never received an estimate; left Considered
                continue;
            }
            self.status[p] = Status::Accepted;
            self.accepted += 1;
            self.update_neighborhood(p);
            return Some(p);
        }
    }

    /// Run until the heap drains or a stop criterion fires.
    /// Returns the number of points accepted by this call.
    pub fn propagate(&mut self) -> usize {
        let stop = self.cfg.stop.clone();
        let mut count = 0;
        while let Some(p) = self.step() {
            count += 1;
            if stop.seed_id == Some(p) {
                break;
            }
            if let Some(limit) = stop.number_of_points {
                if self.accepted >= limit {
                    break;
                }
            }
            if let Some(limit) = stop.travel_time {
                if self.t[p] - limit > DOUBLE_TOL {
                    break;
                }
            }
        }
        count
    }

    fn update_neighborhood(&mut self, p: PointId) {
        for n in self.mesh.neighbors(p) {
            if self.status[n] == Status::Accepted {
                continue;
            }
            self.t[n] = self.estimate(n);
            let res = if self.status[n] == Status::Far {
                self.status[n] = Status::Considered;
                self.heap.insert(n, &self.t)
            } else {
                self.heap.update(n, &self.t)
            };
            if let Err(err) = res {
                tracing::error!(%err, point = n, "heap invariant violated");
            }
        }
    }

    /// Minimum over the fan stencils of every cell containing `n`, and the current value.
    fn estimate(&self, n: PointId) -> f64 {
        let apex = self.mesh.point(n);
        let f = self.cost.map_or(1.0, |c| c[n]);
        let mut best = self.t[n];
        for &c in self.mesh.point_cells(n) {
            for stencil in fan(self.mesh.cell(c), n) {
                let candidate = match stencil {
                    Stencil::Segment(b) => self.line_candidate(apex, b, f),
                    Stencil::Triangle(b0, b1) => self.triangle_candidate(apex, b0, b1, f),
                };
                if let Some(t) = candidate {
                    best = best.min(t);
                }
            }
        }
        best
    }

    fn line_candidate(&self, apex: Vector3<f64>, b: PointId, f: f64) -> Option<f64> {
        (self.status[b] == Status::Accepted).then(|| line_update(apex, self.support(b), f))
    }

    fn triangle_candidate(
        &self,
        apex: Vector3<f64>,
        b0: PointId,
        b1: PointId,
        f: f64,
    ) -> Option<f64> {
        match (self.status[b0], self.status[b1]) {
            (Status::Accepted, Status::Accepted) => Some(triangle_update(
                apex,
                self.support(b0),
                self.support(b1),
                f + self.cfg.regularization,
                self.cfg.search_larger_root,
            )),
            (Status::Accepted, missing) => self.fallback_line(apex, b0, missing, f),
            (missing, Status::Accepted) => self.fallback_line(apex, b1, missing, f),
            _ => None,
        }
    }

    /// Edge update from the accepted vertex of a half-accepted triangle.
    fn fallback_line(
        &self,
        apex: Vector3<f64>,
        accepted: PointId,
        missing: Status,
        f: f64,
    ) -> Option<f64> {
        let allowed = self.allow_line_update
            && (missing == Status::Far || self.cfg.update_from_considered);
        allowed.then(|| line_update(apex, self.support(accepted), f))
    }

    #[inline]
    fn support(&self, p: PointId) -> Support {
        Support {
            pos: self.mesh.point(p),
            t: self.t[p],
        }
    }

    #[inline]
    pub fn status(&self, p: PointId) -> Status {
        self.status[p]
    }

    /// Current value at `p`; `None` while no estimate exists.
    #[inline]
    pub fn arrival_time(&self, p: PointId) -> Option<f64> {
        let t = self.t[p];
        t.is_finite().then_some(t)
    }

    #[inline]
    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    #[inline]
    pub fn considered_count(&self) -> usize {
        self.heap.len()
    }

    pub fn mesh(&self) -> &'m PolyMesh {
        self.mesh
    }

    /// Export: values without an estimate are set to 0.
    pub fn into_solution(self) -> EikonalSolution {
        let unreached = self.t.iter().filter(|t| !t.is_finite()).count();
        if unreached > 0 {
            tracing::warn!(unreached, "points not reached by the front; values set to 0");
        }
        tracing::debug!(
            accepted = self.accepted,
            considered = self.heap.len(),
            "fast marching finished"
        );
        let values = self
            .t
            .into_iter()
            .map(|t| if t.is_finite() { t } else { 0.0 })
            .collect();
        EikonalSolution {
            name: self.cfg.solution_array_name,
            values,
            accepted: self.accepted,
            unreached,
        }
    }
}

fn push_unique(list: &mut Vec<PointId>, p: PointId) {
    if !list.contains(&p) {
        list.push(p);
    }
}

/// Validate seeds; returns the initialization values when configured.
fn validate_seeds<'m>(
    mesh: &'m PolyMesh,
    seeds: &SeedBoundary,
) -> Result<Option<&'m [f64]>, EikonalError> {
    if seeds.ids.is_empty() {
        return Err(EikonalError::EmptySeeds);
    }
    let num_points = mesh.num_points();
    if let Some(&id) = seeds.ids.iter().find(|&&id| id >= num_points) {
        return Err(EikonalError::SeedOutOfRange { id, num_points });
    }
    match &seeds.initialization_array {
        None => Ok(None),
        Some(name) => mesh
            .point_array(name)
            .map(Some)
            .ok_or_else(|| EikonalError::MissingInitializationArray { name: name.clone() }),
    }
}

fn validate_polyline(num_points: usize, pb: &PolylineBoundary) -> Result<(), EikonalError> {
    if pb.intersected_edges.len() != pb.polylines.num_points() {
        return Err(EikonalError::IntersectedEdgesLength {
            expected: pb.polylines.num_points(),
            got: pb.intersected_edges.len(),
        });
    }
    if let Some(&edge) = pb
        .intersected_edges
        .iter()
        .find(|&&(a, b)| a >= num_points || b >= num_points)
    {
        return Err(EikonalError::EdgeOutOfRange { edge, num_points });
    }
    let available = pb.polylines.num_points();
    for (line, ids) in pb.polylines.lines.iter().enumerate() {
        if let Some(&id) = ids.iter().find(|&&id| id >= available) {
            return Err(EikonalError::PolylinePointOutOfRange {
                line,
                id,
                num_points: available,
            });
        }
    }
    Ok(())
}

/// Run Fast Marching to completion (or to a stop criterion) and export the result.
pub fn solve_eikonal(
    mesh: &PolyMesh,
    cfg: FastMarchingCfg,
    boundary: &Boundary,
) -> Result<EikonalSolution, EikonalError> {
    let mut fm = FastMarching::new(mesh, cfg, boundary)?;
    fm.propagate();
    Ok(fm.into_solution())
}
