//! `Polylines`: a point set plus lines given as point-id sequences.

use nalgebra::Vector3;

use crate::cfg::DOUBLE_TOL;

/// Points with polylines over them. Lines may share points (T-junctions).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polylines {
    pub points: Vec<Vector3<f64>>,
    pub lines: Vec<Vec<usize>>,
}

impl Polylines {
    #[inline]
    pub fn new(points: Vec<Vector3<f64>>, lines: Vec<Vec<usize>>) -> Self {
        Self { points, lines }
    }

    /// Append a point and return its id.
    #[inline]
    pub fn push_point(&mut self, p: Vector3<f64>) -> usize {
        self.points.push(p);
        self.points.len() - 1
    }

    #[inline]
    pub fn push_line(&mut self, ids: Vec<usize>) {
        self.lines.push(ids);
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Coordinates of line `k` in order.
    pub fn line_points(&self, k: usize) -> Vec<Vector3<f64>> {
        self.lines[k].iter().map(|&id| self.points[id]).collect()
    }

    /// Arc length of line `k`.
    pub fn line_length(&self, k: usize) -> f64 {
        self.lines[k]
            .windows(2)
            .map(|w| (self.points[w[1]] - self.points[w[0]]).norm())
            .sum()
    }

    /// Lines that pass through point `id`.
    pub fn lines_through(&self, id: usize) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, ids)| ids.contains(&id))
            .map(|(k, _)| k)
            .collect()
    }

    /// Euclidean distance from `x` to line `k` (closest point over its segments).
    ///
    /// Single-point lines measure the distance to that point; empty lines are `None`.
    pub fn distance_to_line(&self, x: Vector3<f64>, k: usize) -> Option<f64> {
        let ids = &self.lines[k];
        match ids.len() {
            0 => None,
            1 => Some((x - self.points[ids[0]]).norm()),
            _ => ids
                .windows(2)
                .map(|w| distance_to_segment(x, self.points[w[0]], self.points[w[1]]))
                .reduce(f64::min),
        }
    }

    /// Reverse the point order of every line (ids are kept).
    pub fn reverse_lines(&mut self) {
        for ids in &mut self.lines {
            ids.reverse();
        }
    }
}

/// Distance from `x` to the closed segment `[a, b]`.
pub(crate) fn distance_to_segment(x: Vector3<f64>, a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= DOUBLE_TOL {
        return (x - a).norm();
    }
    let t = ((x - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (x - (a + ab * t)).norm()
}
