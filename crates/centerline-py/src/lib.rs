//! PyO3 bindings for the `centerline` crate.
//!
//! Notes
//! - Keep bindings thin: meshes cross the boundary as point tuples and cell
//!   id lists; results come back as plain lists.
//! - Errors from the core crate surface as `ValueError`.

use pyo3::prelude::*;

mod common;
mod lines;
mod marching;

#[pymodule]
fn centerline_native(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", centerline::VERSION)?;
    marching::register(m)?;
    lines::register(m)?;
    Ok(())
}
