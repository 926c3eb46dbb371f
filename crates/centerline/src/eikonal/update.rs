//! Virtual fan triangulation and the local arrival-time updates.

use nalgebra::Vector3;

use super::quadratic::solve_quadratic;
use crate::cfg::{DOUBLE_TOL, LARGE_DOUBLE};
use crate::mesh::PointId;

/// Local update stencil around an apex point inside one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stencil {
    /// Virtual triangle `(apex, b0, b1)`; `b0` precedes `b1` in the cell.
    Triangle(PointId, PointId),
    /// Line cell: the only other point.
    Segment(PointId),
}

/// Stencils of `cell` around `apex`: every pair of the other cell points
/// forms a triangle with `apex`; a 2-point cell yields its segment.
///
/// Restartable: calling `fan` again on the same input yields the same sequence.
pub fn fan(cell: &[PointId], apex: PointId) -> impl Iterator<Item = Stencil> + '_ {
    let others = move || cell.iter().copied().filter(move |&p| p != apex);
    let segment = match (others().next(), others().nth(1)) {
        (Some(only), None) => Some(Stencil::Segment(only)),
        _ => None,
    };
    let triangles = others().enumerate().flat_map(move |(j, b0)| {
        others()
            .skip(j + 1)
            .map(move |b1| Stencil::Triangle(b0, b1))
    });
    segment.into_iter().chain(triangles)
}

/// Base vertex of a triangle update.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Support {
    pub pos: Vector3<f64>,
    pub t: f64,
}

/// Edge update `T_q + |p - q| F`.
#[inline]
pub(crate) fn line_update(apex: Vector3<f64>, q: Support, f: f64) -> f64 {
    q.t + (apex - q.pos).norm() * f
}

/// Planar two-vertex update of `apex` from accepted `v0`, `v1` (in cell order).
///
/// Unfolds the triangle, solves for the wavefront arrival at `apex`, and
/// accepts the result only when the front crosses the triangle from the
/// `v0`–`v1` side (causality). Only the smaller root is tested unless
/// `larger_root` is set. Otherwise returns the better of the two edge
/// updates. `f_eff` already includes the regularization term.
pub(crate) fn triangle_update(
    apex: Vector3<f64>,
    v0: Support,
    v1: Support,
    f_eff: f64,
    larger_root: bool,
) -> f64 {
    let (l0, n0) = edge_length_and_direction(apex - v0.pos);
    let (l1, n1) = edge_length_and_direction(apex - v1.pos);
    let mut cos_theta = n0.dot(&n1);
    if cos_theta.abs() < DOUBLE_TOL {
        cos_theta = 0.0;
    }

    // `a` is the base vertex with the larger arrival time.
    let ((la, ta), (lb, tb)) = if v0.t - v1.t > DOUBLE_TOL {
        ((l0, v0.t), (l1, v1.t))
    } else {
        ((l1, v1.t), (l0, v0.t))
    };
    let fallback = (la * f_eff + ta).min(lb * f_eff + tb);

    let u = ta - tb;
    let a_eq = la * la + lb * lb - 2.0 * la * lb * cos_theta;
    let b_eq = 2.0 * lb * u * (la * cos_theta - lb);
    let c_eq = lb * lb * (u * u - f_eff * f_eff * la * la * (1.0 - cos_theta * cos_theta));

    let t_comp_lower = la * cos_theta;
    let t_comp_higher = if cos_theta.abs() > DOUBLE_TOL {
        la / cos_theta
    } else {
        LARGE_DOUBLE
    };
    let causal = |t: f64| {
        if t.abs() <= DOUBLE_TOL {
            return false;
        }
        let t_comp = lb * (t - u) / t;
        u - t < -DOUBLE_TOL
            && t_comp - t_comp_lower > DOUBLE_TOL
            && t_comp - t_comp_higher < -DOUBLE_TOL
    };
    let roots = solve_quadratic(a_eq, b_eq, c_eq);
    let found = if larger_root {
        roots.ascending().into_iter().flatten().find(|&t| causal(t))
    } else {
        roots.min_root().filter(|&t| causal(t))
    };
    found.map_or(fallback, |t| t + tb)
}

/// Length and unit direction; zero-length edges get a zero direction.
#[inline]
fn edge_length_and_direction(v: Vector3<f64>) -> (f64, Vector3<f64>) {
    let len = v.norm();
    if len > DOUBLE_TOL {
        (len, v / len)
    } else {
        (0.0, Vector3::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_of_quad_around_each_corner() {
        let quad = [0, 1, 2, 3];
        let tris: Vec<_> = fan(&quad, 2).collect();
        assert_eq!(
            tris,
            vec![
                Stencil::Triangle(0, 1),
                Stencil::Triangle(0, 3),
                Stencil::Triangle(1, 3)
            ]
        );
        // restartable
        assert_eq!(fan(&quad, 2).count(), 3);
        assert_eq!(fan(&[4, 7, 9], 7).collect::<Vec<_>>(), vec![Stencil::Triangle(4, 9)]);
    }

    #[test]
    fn fan_of_line_cell_is_segment() {
        assert_eq!(fan(&[5, 8], 8).collect::<Vec<_>>(), vec![Stencil::Segment(5)]);
        // apex not in cell: plain pairs
        assert_eq!(fan(&[5, 8], 1).collect::<Vec<_>>(), vec![Stencil::Triangle(5, 8)]);
    }

    #[test]
    fn plane_wave_through_right_triangle_is_exact() {
        // Front T(x, y) = y arriving from below; apex on the far side.
        let apex: Vector3<f64> = Vector3::new(0.5, 1.0, 0.0);
        let v0 = Support {
            pos: Vector3::new(0.0, 0.0, 0.0),
            t: 0.0,
        };
        let v1 = Support {
            pos: Vector3::new(1.0, 0.0, 0.0),
            t: 0.0,
        };
        let t = triangle_update(apex, v0, v1, 1.0, true);
        assert!((t - 1.0).abs() < 1e-9, "t = {t}");
        // the smaller root is negative: edge estimate only
        let t = triangle_update(apex, v0, v1, 1.0, false);
        assert!((t - apex.norm()).abs() < 1e-12, "t = {t}");
    }

    #[test]
    fn oblique_plane_wave_depends_on_root_search() {
        // T(x) = n·x with n = (0.6, 0.8); the characteristic into the apex
        // crosses the base edge at x = 0.05 and belongs to the larger root.
        let n = Vector3::new(0.6, 0.8, 0.0);
        let p0 = Vector3::new(0.0, 0.0, 0.0);
        let p1 = Vector3::new(1.0, 0.0, 0.0);
        let apex = Vector3::new(0.8, 1.0, 0.0);
        let v0 = Support { pos: p0, t: n.dot(&p0) };
        let v1 = Support { pos: p1, t: n.dot(&p1) };

        let t = triangle_update(apex, v0, v1, 1.0, false);
        let edge_only = (apex - p0).norm().min(0.6 + (apex - p1).norm());
        assert!((t - edge_only).abs() < 1e-12, "t = {t}");

        let t = triangle_update(apex, v0, v1, 1.0, true);
        assert!((t - n.dot(&apex)).abs() < 1e-9, "t = {t}");
        assert!(t < edge_only);
    }

    #[test]
    fn front_from_outside_the_base_edge_is_rejected() {
        // n = (0.8, 0.6): the characteristic misses the base edge.
        let n = Vector3::new(0.8, 0.6, 0.0);
        let p1 = Vector3::new(1.0, 0.0, 0.0);
        let apex: Vector3<f64> = Vector3::new(0.5, 1.0, 0.0);
        let v0 = Support {
            pos: Vector3::zeros(),
            t: 0.0,
        };
        let v1 = Support { pos: p1, t: n.dot(&p1) };
        let edge_only = (apex.norm()).min(0.8 + (apex - p1).norm());
        for larger_root in [false, true] {
            let t = triangle_update(apex, v0, v1, 1.0, larger_root);
            assert!((t - edge_only).abs() < 1e-12, "t = {t}");
        }
    }

    #[test]
    fn non_causal_configuration_falls_back_to_edges() {
        // Apex on the line through both base vertices: no planar solution.
        let apex = Vector3::new(2.0, 0.0, 0.0);
        let v0 = Support {
            pos: Vector3::new(0.0, 0.0, 0.0),
            t: 0.0,
        };
        let v1 = Support {
            pos: Vector3::new(1.0, 0.0, 0.0),
            t: 1.0,
        };
        let t = triangle_update(apex, v0, v1, 1.0, false);
        assert!((t - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_edge_does_not_produce_nan() {
        let apex = Vector3::new(1.0, 1.0, 0.0);
        let v0 = Support { pos: apex, t: 0.3 };
        let v1 = Support {
            pos: Vector3::new(0.0, 1.0, 0.0),
            t: 0.0,
        };
        let t = triangle_update(apex, v0, v1, 1.0, false);
        assert!(t.is_finite());
        assert!((t - 0.3).abs() < 1e-12);
    }
}
