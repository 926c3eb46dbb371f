//! Discrete steepest descent over the cells around a location.

use nalgebra::Vector3;

use super::types::{Descent, Direction, EdgePoint, TraceError, DEFAULT_SUBDIVISIONS};
use crate::cfg::{DOUBLE_TOL, LARGE_DOUBLE};
use crate::mesh::{CellId, PolyMesh};

/// Steepest descent of a point scalar field on the 1-skeleton.
#[derive(Clone, Copy, Debug)]
pub struct SteepestDescent<'m> {
    mesh: &'m PolyMesh,
    field: &'m [f64],
    direction: Direction,
    subdivisions: usize,
}

impl<'m> SteepestDescent<'m> {
    pub fn new(
        mesh: &'m PolyMesh,
        array: &str,
        direction: Direction,
    ) -> Result<Self, TraceError> {
        let field = mesh
            .point_array(array)
            .ok_or_else(|| TraceError::MissingDescentArray {
                name: array.to_string(),
            })?;
        Ok(Self {
            mesh,
            field,
            direction,
            subdivisions: DEFAULT_SUBDIVISIONS,
        })
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Result<Self, TraceError> {
        if subdivisions == 0 {
            return Err(TraceError::ZeroSubdivisions);
        }
        self.subdivisions = subdivisions;
        Ok(self)
    }

    #[inline]
    pub fn field(&self) -> &'m [f64] {
        self.field
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Best move from `at` to the boundary of `cell`.
    ///
    /// Every cell edge `pts[i] → pts[i+1]` (cyclic) is sampled at
    /// `s = j / subdivisions`, `j < subdivisions`. From a vertex, edges that
    /// start at it are skipped; the edge `at` lies on contributes its start
    /// point only. `None` if no candidate exists.
    pub fn steepest_descent_in_cell(&self, cell: CellId, at: &EdgePoint) -> Option<Descent> {
        let factor = self.direction.factor();
        let here = at.position(self.mesh);
        let here_value = at.interpolate(self.field);
        let pts = self.mesh.cell(cell);
        let n = pts.len();

        let mut best: Option<Descent> = None;
        let mut best_value = -LARGE_DOUBLE * factor;
        let mut consider = |target: EdgePoint, pos: Vector3<f64>, value: f64| {
            let length = (pos - here).norm();
            let d = if length > DOUBLE_TOL {
                -(value - here_value) / length
            } else {
                0.0
            };
            if factor * (d - best_value) > DOUBLE_TOL {
                best_value = d;
                best = Some(Descent {
                    target,
                    value: d,
                    length,
                });
            }
        };

        for i in 0..n {
            let (p0, p1) = (pts[i], pts[(i + 1) % n]);
            if at.is_vertex() {
                if p0 == at.edge.0 {
                    continue;
                }
            } else if (p0, p1) == at.edge || (p1, p0) == at.edge {
                consider(EdgePoint::vertex(p0), self.mesh.point(p0), self.field[p0]);
                continue;
            }
            for j in 0..self.subdivisions {
                let s = j as f64 / self.subdivisions as f64;
                let target = if s.abs() < DOUBLE_TOL {
                    EdgePoint::vertex(p0)
                } else {
                    EdgePoint::new(p0, p1, s)
                };
                consider(target, target.position(self.mesh), target.interpolate(self.field));
            }
        }
        best
    }

    /// Best move over every cell containing the edge (or vertex) of `at`.
    pub fn steepest_descent(&self, at: &EdgePoint) -> Option<Descent> {
        let factor = self.direction.factor();
        let mut best: Option<Descent> = None;
        for cell in self.mesh.cells_with_edge(at.edge.0, at.edge.1) {
            let Some(candidate) = self.steepest_descent_in_cell(cell, at) else {
                continue;
            };
            let better = best.map_or(true, |b| factor * (candidate.value - b.value) > DOUBLE_TOL);
            if better {
                best = Some(candidate);
            }
        }
        best
    }
}
