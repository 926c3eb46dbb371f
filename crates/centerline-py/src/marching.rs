//! Fast Marching bindings.

use crate::common::{mesh_from_py, to_py_err, PyPoint};
use centerline::api::{solve_eikonal, Boundary, FastMarchingCfg, SpeedModel};
use pyo3::prelude::*;

const COST_ARRAY: &str = "Cost";

/// Arrival times from `seeds`; unit speed unless a per-point `cost` is given.
/// Unreached points are reported as 0.
#[pyfunction]
#[pyo3(signature = (points, cells, seeds, cost=None))]
pub fn eikonal_solution(
    points: Vec<PyPoint>,
    cells: Vec<Vec<usize>>,
    seeds: Vec<usize>,
    cost: Option<Vec<f64>>,
) -> PyResult<Vec<f64>> {
    let mut mesh = mesh_from_py(points, cells)?;
    let speed = match cost {
        Some(values) => {
            mesh.add_point_array(COST_ARRAY, values).map_err(to_py_err)?;
            SpeedModel::CostArray(COST_ARRAY.to_string())
        }
        None => SpeedModel::Unit,
    };
    let cfg = FastMarchingCfg {
        speed,
        ..FastMarchingCfg::default()
    };
    let sol = solve_eikonal(&mesh, cfg, &Boundary::from_seeds(seeds)).map_err(to_py_err)?;
    Ok(sol.values)
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(eikonal_solution, m)?)?;
    Ok(())
}
