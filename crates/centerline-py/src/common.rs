use centerline::api::PolyMesh;
use nalgebra::Vector3;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub type PyPoint = (f64, f64, f64);

pub fn mesh_from_py(points: Vec<PyPoint>, cells: Vec<Vec<usize>>) -> PyResult<PolyMesh> {
    let points = points
        .into_iter()
        .map(|(x, y, z)| Vector3::new(x, y, z))
        .collect();
    PolyMesh::new(points, cells).map_err(to_py_err)
}

pub fn points_to_py(points: &[Vector3<f64>]) -> Vec<PyPoint> {
    points.iter().map(|p| (p.x, p.y, p.z)).collect()
}

pub fn to_py_err<E: std::fmt::Display>(err: E) -> PyErr {
    PyValueError::new_err(err.to_string())
}
