//! Centerline bindings.

use crate::common::{mesh_from_py, points_to_py, to_py_err, PyPoint};
use centerline::api::{extract_centerlines, CenterlineParams, DEFAULT_RADIUS_ARRAY_NAME};
use pyo3::prelude::*;

/// Centerlines from `sources` to `targets` on a Voronoi mesh with per-point `radius`.
///
/// Returns `(points, lines, radius)`; every line runs source → target.
#[pyfunction]
#[pyo3(signature = (points, cells, radius, sources, targets, resample=None))]
pub fn centerlines(
    points: Vec<PyPoint>,
    cells: Vec<Vec<usize>>,
    radius: Vec<f64>,
    sources: Vec<usize>,
    targets: Vec<usize>,
    resample: Option<f64>,
) -> PyResult<(Vec<PyPoint>, Vec<Vec<usize>>, Vec<f64>)> {
    let mesh = mesh_from_py(points, cells)?
        .with_point_array(DEFAULT_RADIUS_ARRAY_NAME, radius)
        .map_err(to_py_err)?;
    let params = CenterlineParams {
        resampling_step: resample,
        ..CenterlineParams::default()
    };
    let out = extract_centerlines(&mesh, &sources, &targets, &params).map_err(to_py_err)?;
    Ok((points_to_py(&out.lines.points), out.lines.lines, out.radius))
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(centerlines, m)?)?;
    Ok(())
}
