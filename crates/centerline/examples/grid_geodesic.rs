//! Arrival times on a jittered grid versus straight-line distance.
//!
//! Usage:
//!   cargo run -p centerline --example grid_geodesic -- [seed]
//!
//! Prints the relative error of `T` against `|x - x0|` at a few sample points,
//! then traces a path back from the far corner.

use centerline::api::{
    grid, solve_eikonal, trace_paths, Boundary, FastMarchingCfg, GridCfg, TracerCfg,
    DEFAULT_SOLUTION_ARRAY_NAME,
};

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2025);
    let cfg = GridCfg {
        nx: 41,
        ny: 41,
        spacing: 0.25,
        jitter: 0.2,
        seed,
    };
    let mesh = grid(cfg).unwrap();
    let sol = solve_eikonal(&mesh, FastMarchingCfg::default(), &Boundary::from_seeds([0])).unwrap();
    let origin = mesh.point(0);
    for (i, j) in [(10, 0), (0, 20), (20, 20), (40, 40), (40, 10)] {
        let id = cfg.id(i, j);
        let exact = (mesh.point(id) - origin).norm();
        let t = sol.values[id];
        println!(
            "({i:2},{j:2}): T={t:.4} |x-x0|={exact:.4} rel={:+.3}%",
            100.0 * (t - exact) / exact
        );
    }

    let marched = sol.attach_to(&mesh).unwrap();
    let far = cfg.id(40, 40);
    let stop = TracerCfg {
        stop_on_targets: true,
        ..TracerCfg::default()
    };
    let paths = trace_paths(&marched, DEFAULT_SOLUTION_ARRAY_NAME, &[far], &[0], stop).unwrap();
    println!(
        "path from corner: {} points, length {:.4}, outcome {:?}",
        paths.polylines.num_points(),
        paths.polylines.line_length(0),
        paths.outcomes[0]
    );
}
