//! `PolyMesh`: points, cells, links and named point arrays.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Vector3;

/// Index into `PolyMesh::points`.
pub type PointId = usize;
/// Index into `PolyMesh::cells`.
pub type CellId = usize;

/// Errors raised while building or decorating a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A cell references a point id that does not exist.
    PointOutOfRange { cell: CellId, point: PointId },
    /// A cell has fewer than two points.
    DegenerateCell { cell: CellId },
    /// A point array does not have one value per point.
    ArrayLength {
        name: String,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::PointOutOfRange { cell, point } => {
                write!(f, "cell {cell} references missing point {point}")
            }
            MeshError::DegenerateCell { cell } => {
                write!(f, "cell {cell} has fewer than two points")
            }
            MeshError::ArrayLength {
                name,
                expected,
                got,
            } => write!(
                f,
                "point array {name:?} has {got} values, mesh has {expected} points"
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Polygonal mesh with point→cell links and named point arrays.
///
/// Invariants:
/// - every cell id list references existing points and has length ≥ 2;
/// - `links[p]` lists every cell containing `p`, in increasing cell order;
/// - every array in `point_data` has exactly `points.len()` values.
#[derive(Clone, Debug, Default)]
pub struct PolyMesh {
    points: Vec<Vector3<f64>>,
    cells: Vec<Vec<PointId>>,
    links: Vec<Vec<CellId>>,
    point_data: BTreeMap<String, Vec<f64>>,
}

impl PolyMesh {
    /// Build a mesh and its links; rejects dangling ids and 0/1-point cells.
    pub fn new(points: Vec<Vector3<f64>>, cells: Vec<Vec<PointId>>) -> Result<Self, MeshError> {
        let mut links: Vec<Vec<CellId>> = vec![Vec::new(); points.len()];
        for (cid, cell) in cells.iter().enumerate() {
            if cell.len() < 2 {
                return Err(MeshError::DegenerateCell { cell: cid });
            }
            for &p in cell {
                let Some(link) = links.get_mut(p) else {
                    return Err(MeshError::PointOutOfRange { cell: cid, point: p });
                };
                // A point listed twice in one cell still links the cell once.
                if link.last() != Some(&cid) {
                    link.push(cid);
                }
            }
        }
        Ok(Self {
            points,
            cells,
            links,
            point_data: BTreeMap::new(),
        })
    }

    /// Builder form of `add_point_array`.
    pub fn with_point_array(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, MeshError> {
        self.add_point_array(name, values)?;
        Ok(self)
    }

    /// Attach (or replace) a named per-point array.
    pub fn add_point_array(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), MeshError> {
        let name = name.into();
        if values.len() != self.points.len() {
            return Err(MeshError::ArrayLength {
                name,
                expected: self.points.len(),
                got: values.len(),
            });
        }
        self.point_data.insert(name, values);
        Ok(())
    }

    #[inline]
    pub fn point_array(&self, name: &str) -> Option<&[f64]> {
        self.point_data.get(name).map(Vec::as_slice)
    }

    #[inline]
    pub fn point_arrays(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.point_data
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn point(&self, id: PointId) -> Vector3<f64> {
        self.points[id]
    }

    #[inline]
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> &[PointId] {
        &self.cells[id]
    }

    #[inline]
    pub fn cells(&self) -> &[Vec<PointId>] {
        &self.cells
    }

    /// Cells containing `p`.
    #[inline]
    pub fn point_cells(&self, p: PointId) -> &[CellId] {
        &self.links[p]
    }

    /// Cells containing both `p` and `q`; for `p == q` every cell containing `p`.
    pub fn cells_with_edge(&self, p: PointId, q: PointId) -> Vec<CellId> {
        if p == q {
            return self.links[p].clone();
        }
        self.links[p]
            .iter()
            .copied()
            .filter(|&c| self.cells[c].contains(&q))
            .collect()
    }

    /// Topological neighbors of `p`: every other point of every cell containing `p`,
    /// deduplicated, in first-seen order.
    pub fn neighbors(&self, p: PointId) -> Vec<PointId> {
        let mut out: Vec<PointId> = Vec::new();
        for &c in &self.links[p] {
            for &q in &self.cells[c] {
                if q != p && !out.contains(&q) {
                    out.push(q);
                }
            }
        }
        out
    }

    /// Position at parametric coordinate `s` on the segment `p → q`.
    #[inline]
    pub fn lerp(&self, p: PointId, q: PointId, s: f64) -> Vector3<f64> {
        self.points[p] * (1.0 - s) + self.points[q] * s
    }

    #[inline]
    pub fn distance(&self, p: PointId, q: PointId) -> f64 {
        (self.points[p] - self.points[q]).norm()
    }
}
