//! Tolerance defaults shared by the heap, the solver and the tracer (internal).
//!
//! Policy
//! - Fixed constants, same values across modules. Comparisons that decide
//!   ordering or acceptance go through `DOUBLE_TOL`; `LARGE_DOUBLE` only
//!   appears where a finite stand-in for "unbounded" is needed.

/// Comparison tolerance for arrival times, descent values and lengths.
pub(crate) const DOUBLE_TOL: f64 = 1e-12;
/// Finite stand-in for an unbounded value (e.g. cost at a zero radius).
pub(crate) const LARGE_DOUBLE: f64 = 1e32;
