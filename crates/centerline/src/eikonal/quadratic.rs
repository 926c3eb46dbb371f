//! Numerically stable real roots of `a x² + b x + c = 0`.

use crate::cfg::DOUBLE_TOL;

/// Real roots of a quadratic (or its linear degeneration).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QuadraticRoots {
    /// Discriminant below `-ε`.
    NoRealRoots,
    /// `|a| ≤ ε` and `|b| ≤ ε`: no isolated root.
    Degenerate,
    /// Linear case `b x + c = 0`.
    One(f64),
    /// Two roots (equal when the discriminant vanishes).
    Two(f64, f64),
}

impl QuadraticRoots {
    /// Smallest root, if any.
    pub fn min_root(self) -> Option<f64> {
        match self {
            Self::One(x) => Some(x),
            Self::Two(x0, x1) => Some(x0.min(x1)),
            Self::NoRealRoots | Self::Degenerate => None,
        }
    }

    /// Roots in ascending order.
    pub fn ascending(self) -> [Option<f64>; 2] {
        match self {
            Self::One(x) => [Some(x), None],
            Self::Two(x0, x1) => [Some(x0.min(x1)), Some(x0.max(x1))],
            Self::NoRealRoots | Self::Degenerate => [None, None],
        }
    }
}

/// Solve `a x² + b x + c = 0`.
///
/// Uses `q = -(b + sign(b)·√Δ)/2`, `x0 = q/a`, `x1 = c/q` to avoid
/// cancellation. A discriminant in `[-ε, ε]` is treated as a double root.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> QuadraticRoots {
    let delta = b * b - 4.0 * a * c;
    if delta < -DOUBLE_TOL {
        return QuadraticRoots::NoRealRoots;
    }
    if a.abs() > DOUBLE_TOL {
        if delta < DOUBLE_TOL {
            let x = -b / (2.0 * a);
            return QuadraticRoots::Two(x, x);
        }
        let sqrt_delta = delta.sqrt();
        if b < -DOUBLE_TOL {
            let q = -0.5 * (b - sqrt_delta);
            QuadraticRoots::Two(q / a, c / q)
        } else if b > DOUBLE_TOL {
            let q = -0.5 * (b + sqrt_delta);
            QuadraticRoots::Two(q / a, c / q)
        } else {
            // b ≈ 0: symmetric roots ±√(-c/a)
            let r = (-c / a).max(0.0).sqrt();
            QuadraticRoots::Two(-r, r)
        }
    } else if b.abs() > DOUBLE_TOL {
        QuadraticRoots::One(-c / b)
    } else {
        QuadraticRoots::Degenerate
    }
}
