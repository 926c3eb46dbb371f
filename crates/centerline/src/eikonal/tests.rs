use std::f64::consts::SQRT_2;

use nalgebra::Vector3;

use super::*;
use crate::meshgen::{chain, disk, grid, DiskCfg, GridCfg};
use crate::mesh::{PolyMesh, Polylines};

fn unit_square() -> PolyMesh {
    let pts = vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    ];
    PolyMesh::new(pts, vec![vec![0, 1, 2, 3]]).unwrap()
}

fn close(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
}

/// Shortest paths over cell edges (all point pairs of a cell).
fn graph_distances(mesh: &PolyMesh, source: usize) -> Vec<f64> {
    let mut d = vec![f64::INFINITY; mesh.num_points()];
    d[source] = 0.0;
    loop {
        let mut changed = false;
        for p in 0..mesh.num_points() {
            for q in mesh.neighbors(p) {
                let via = d[q] + mesh.distance(p, q);
                if via + 1e-15 < d[p] {
                    d[p] = via;
                    changed = true;
                }
            }
        }
        if !changed {
            return d;
        }
    }
}

#[test]
fn square_diagonal_is_euclidean() {
    let m = unit_square();
    let sol = solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_seeds([0])).unwrap();
    assert!(close(&sol.values, &[0.0, 1.0, SQRT_2, 1.0], 1e-12), "{:?}", sol.values);
    assert_eq!(sol.name, DEFAULT_SOLUTION_ARRAY_NAME);
    assert_eq!(sol.accepted, 4);
    assert_eq!(sol.unreached, 0);
}

#[test]
fn chain_of_lines_accumulates_lengths() {
    let m = chain(&[0.0, 1.0, 3.0, 6.0]).unwrap();
    let sol = solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_seeds([0])).unwrap();
    assert!(close(&sol.values, &[0.0, 1.0, 3.0, 6.0], 1e-12));

    let both_ends = solve_eikonal(
        &m,
        FastMarchingCfg::default(),
        &Boundary::from_seeds([0, 3]),
    )
    .unwrap();
    assert!(close(&both_ends.values, &[0.0, 1.0, 3.0, 0.0], 1e-12));
}

#[test]
fn cost_array_scales_travel_time() {
    let m = chain(&[0.0, 1.0, 3.0, 6.0])
        .unwrap()
        .with_point_array("cost", vec![2.0; 4])
        .unwrap();
    let cfg = FastMarchingCfg {
        speed: SpeedModel::CostArray("cost".into()),
        ..FastMarchingCfg::default()
    };
    let sol = solve_eikonal(&m, cfg, &Boundary::from_seeds([0])).unwrap();
    assert!(close(&sol.values, &[0.0, 2.0, 6.0, 12.0], 1e-12));
}

#[test]
fn initialization_array_offsets_seeds() {
    let m = chain(&[0.0, 1.0, 3.0, 6.0])
        .unwrap()
        .with_point_array("init", vec![0.5, 0.0, 0.0, 0.0])
        .unwrap();
    let boundary = Boundary {
        seeds: Some(SeedBoundary {
            ids: vec![0],
            initialization_array: Some("init".into()),
        }),
        polyline: None,
    };
    let sol = solve_eikonal(&m, FastMarchingCfg::default(), &boundary).unwrap();
    assert!(close(&sol.values, &[0.5, 1.5, 3.5, 6.5], 1e-12));
}

#[test]
fn stop_after_number_of_points() {
    let m = chain(&[0.0, 1.0, 3.0, 6.0]).unwrap();
    let cfg = FastMarchingCfg {
        stop: StopCriteria {
            number_of_points: Some(2),
            ..StopCriteria::default()
        },
        ..FastMarchingCfg::default()
    };
    let mut fm = FastMarching::new(&m, cfg, &Boundary::from_seeds([0])).unwrap();
    assert_eq!(fm.propagate(), 1);
    assert_eq!(fm.accepted_count(), 2);
    assert_eq!(fm.status(2), Status::Considered);
    assert_eq!(fm.arrival_time(2), Some(3.0));
    assert_eq!(fm.status(3), Status::Far);
    assert_eq!(fm.arrival_time(3), None);

    let sol = fm.into_solution();
    assert!(close(&sol.values, &[0.0, 1.0, 3.0, 0.0], 1e-12));
    assert_eq!(sol.unreached, 1);
}

#[test]
fn stop_at_seed_and_travel_time() {
    let m = chain(&[0.0, 1.0, 3.0, 6.0, 10.0]).unwrap();
    let at_seed = FastMarchingCfg {
        stop: StopCriteria {
            seed_id: Some(2),
            ..StopCriteria::default()
        },
        ..FastMarchingCfg::default()
    };
    let mut fm = FastMarching::new(&m, at_seed, &Boundary::from_seeds([0])).unwrap();
    fm.propagate();
    assert_eq!(fm.status(2), Status::Accepted);
    assert_eq!(fm.status(3), Status::Considered);
    assert_eq!(fm.arrival_time(3), Some(6.0));
    assert_eq!(fm.status(4), Status::Far);

    let by_time = FastMarchingCfg {
        stop: StopCriteria {
            travel_time: Some(2.0),
            ..StopCriteria::default()
        },
        ..FastMarchingCfg::default()
    };
    let mut fm = FastMarching::new(&m, by_time, &Boundary::from_seeds([0])).unwrap();
    fm.propagate();
    // the first point beyond the limit is still accepted
    assert_eq!(fm.status(2), Status::Accepted);
    assert_eq!(fm.status(3), Status::Considered);
}

#[test]
fn disconnected_points_are_zeroed() {
    let pts = (0..4).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
    let m = PolyMesh::new(pts, vec![vec![0, 1], vec![2, 3]]).unwrap();
    let mut fm = FastMarching::new(&m, FastMarchingCfg::default(), &Boundary::from_seeds([0]))
        .unwrap();
    fm.propagate();
    assert_eq!(fm.arrival_time(3), None);
    assert_eq!(fm.status(3), Status::Far);
    let sol = fm.into_solution();
    assert_eq!(sol.values, vec![0.0, 1.0, 0.0, 0.0]);
    assert_eq!(sol.unreached, 2);
}

#[test]
fn points_without_an_estimate_stay_considered() {
    // triangle (2, 4, 5) hangs off the far corner of the unit square
    let pts = vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(2.0, 1.0, 0.0),
        Vector3::new(1.0, 2.0, 0.0),
    ];
    let m = PolyMesh::new(pts, vec![vec![0, 1, 2, 3], vec![2, 4, 5]]).unwrap();
    let cfg = FastMarchingCfg {
        allow_line_update: false,
        ..FastMarchingCfg::default()
    };
    let mut fm = FastMarching::new(&m, cfg, &Boundary::from_seeds([0])).unwrap();
    assert_eq!(fm.propagate(), 3);
    assert_eq!(fm.accepted_count(), 4);
    assert_eq!(fm.considered_count(), 0);
    for p in [4, 5] {
        assert_eq!(fm.status(p), Status::Considered, "point {p}");
        assert_eq!(fm.arrival_time(p), None);
    }
    let sol = fm.into_solution();
    assert_eq!(sol.values[4], 0.0);
    assert_eq!(sol.unreached, 2);
}

#[test]
fn configuration_errors_are_reported_up_front() {
    let m = chain(&[0.0, 1.0, 2.0]).unwrap();
    let seeds = Boundary::from_seeds([0]);

    let missing_cost = FastMarchingCfg {
        speed: SpeedModel::CostArray("nope".into()),
        ..FastMarchingCfg::default()
    };
    assert_eq!(
        FastMarching::new(&m, missing_cost, &seeds).unwrap_err(),
        EikonalError::MissingCostArray {
            name: "nope".into()
        }
    );
    assert_eq!(
        solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::default()).unwrap_err(),
        EikonalError::NoBoundaryConditions
    );
    assert_eq!(
        solve_eikonal(
            &m,
            FastMarchingCfg::default(),
            &Boundary::from_seeds(Vec::new())
        )
        .unwrap_err(),
        EikonalError::EmptySeeds
    );
    assert_eq!(
        solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_seeds([3])).unwrap_err(),
        EikonalError::SeedOutOfRange {
            id: 3,
            num_points: 3
        }
    );
    let negative = FastMarchingCfg {
        regularization: -1.0,
        ..FastMarchingCfg::default()
    };
    assert!(matches!(
        solve_eikonal(&m, negative, &seeds),
        Err(EikonalError::InvalidRegularization { .. })
    ));
    let missing_init = Boundary {
        seeds: Some(SeedBoundary {
            ids: vec![0],
            initialization_array: Some("t0".into()),
        }),
        polyline: None,
    };
    assert!(matches!(
        solve_eikonal(&m, FastMarchingCfg::default(), &missing_init),
        Err(EikonalError::MissingInitializationArray { .. })
    ));
}

#[test]
fn polyline_boundary_errors() {
    let m = chain(&[0.0, 1.0, 2.0]).unwrap();
    let line = Polylines::new(
        vec![Vector3::new(0.5, -1.0, 0.0), Vector3::new(0.5, 1.0, 0.0)],
        vec![vec![0, 1]],
    );
    let short = PolylineBoundary {
        polylines: line.clone(),
        intersected_edges: vec![(0, 1)],
    };
    assert_eq!(
        solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_polyline(short))
            .unwrap_err(),
        EikonalError::IntersectedEdgesLength {
            expected: 2,
            got: 1
        }
    );
    let out_of_range = PolylineBoundary {
        polylines: line,
        intersected_edges: vec![(0, 1), (1, 9)],
    };
    assert!(matches!(
        solve_eikonal(
            &m,
            FastMarchingCfg::default(),
            &Boundary::from_polyline(out_of_range)
        ),
        Err(EikonalError::EdgeOutOfRange { edge: (1, 9), .. })
    ));
    let dangling = PolylineBoundary {
        polylines: Polylines::new(
            vec![Vector3::new(0.5, -1.0, 0.0), Vector3::new(0.5, 1.0, 0.0)],
            vec![vec![0, 5]],
        ),
        intersected_edges: vec![(0, 1), (0, 1)],
    };
    assert_eq!(
        solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_polyline(dangling))
            .unwrap_err(),
        EikonalError::PolylinePointOutOfRange {
            line: 0,
            id: 5,
            num_points: 2
        }
    );
}

#[test]
fn polyline_crossing_an_edge_seeds_its_cells() {
    let m = chain(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    // vertical segment at x = 1.5 crossing edge (1, 2)
    let pb = PolylineBoundary {
        polylines: Polylines::new(
            vec![Vector3::new(1.5, -1.0, 0.0), Vector3::new(1.5, 1.0, 0.0)],
            vec![vec![0, 1]],
        ),
        intersected_edges: vec![(1, 2), (1, 2)],
    };
    let sol = solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_polyline(pb)).unwrap();
    assert!(
        close(&sol.values, &[1.5, 0.5, 0.5, 1.5, 2.5], 1e-12),
        "{:?}",
        sol.values
    );
}

#[test]
fn polyline_through_a_point_pins_it() {
    let m = chain(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    let pb = PolylineBoundary {
        polylines: Polylines::new(
            vec![Vector3::new(2.0, -1.0, 0.0), Vector3::new(2.0, 1.0, 0.0)],
            vec![vec![0, 1]],
        ),
        intersected_edges: vec![(2, 2), (2, 2)],
    };
    let sol = solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_polyline(pb)).unwrap();
    assert!(close(&sol.values, &[2.0, 1.0, 0.0, 1.0, 2.0], 1e-12));
}

#[test]
fn considered_vertices_can_be_excluded_from_edge_fallback() {
    let m = unit_square();
    let cfg = FastMarchingCfg {
        update_from_considered: false,
        ..FastMarchingCfg::default()
    };
    let mut fm = FastMarching::new(&m, cfg, &Boundary::from_seeds([0])).unwrap();
    // point 3 only sees triangles with a Considered base vertex during warm-up
    assert_eq!(fm.arrival_time(1), Some(1.0));
    assert_eq!(fm.arrival_time(3), None);
    assert_eq!(fm.status(3), Status::Considered);
    fm.propagate();
    let sol = fm.into_solution();
    assert!(close(&sol.values, &[0.0, 1.0, SQRT_2, 1.0], 1e-12));
}

#[test]
fn grid_solution_is_bounded_by_graph_and_euclidean_distance() {
    let cfg = GridCfg {
        nx: 12,
        ny: 9,
        jitter: 0.25,
        seed: 42,
        ..GridCfg::default()
    };
    let m = grid(cfg).unwrap();
    let graph = graph_distances(&m, 0);
    let far = cfg.id(cfg.nx - 1, cfg.ny - 1);
    for search_larger_root in [false, true] {
        let fm_cfg = FastMarchingCfg {
            search_larger_root,
            ..FastMarchingCfg::default()
        };
        let sol = solve_eikonal(&m, fm_cfg, &Boundary::from_seeds([0])).unwrap();
        assert_eq!(sol.unreached, 0);
        for p in 0..m.num_points() {
            let t = sol.values[p];
            assert!(t <= graph[p] + 1e-6, "p={p}: {t} > graph {}", graph[p]);
            assert!(t >= 0.9 * m.distance(0, p), "p={p}: {t} too small");
        }
        if search_larger_root {
            // interior triangles shorten paths compared to the edge graph
            assert!(sol.values[far] < graph[far]);
        }
    }
}

#[test]
fn regularization_never_decreases_arrival_times() {
    let m = grid(GridCfg {
        jitter: 0.2,
        seed: 3,
        ..GridCfg::default()
    })
    .unwrap();
    let plain = solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_seeds([0])).unwrap();
    let reg = solve_eikonal(
        &m,
        FastMarchingCfg {
            regularization: 0.5,
            ..FastMarchingCfg::default()
        },
        &Boundary::from_seeds([0]),
    )
    .unwrap();
    for (a, b) in plain.values.iter().zip(&reg.values) {
        assert!(b + 1e-9 >= *a);
    }
}

#[test]
fn disk_front_is_nearly_circular() {
    let cfg = DiskCfg::default();
    let m = disk(cfg).unwrap();
    let sol = solve_eikonal(&m, FastMarchingCfg::default(), &Boundary::from_seeds([0])).unwrap();
    for k in 1..=cfg.rings {
        let ring: Vec<f64> = (0..cfg.sectors).map(|s| sol.values[cfg.id(k, s)]).collect();
        let lo = ring.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = ring.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let kf = k as f64;
        assert!(hi - lo <= 0.1 * kf, "ring {k}: spread {}", hi - lo);
        assert!((lo - kf).abs() <= 0.1 * kf && (hi - kf).abs() <= 0.1 * kf);
    }
}

#[test]
fn acceptance_order_is_monotone() {
    let m = grid(GridCfg {
        nx: 9,
        ny: 9,
        jitter: 0.25,
        seed: 11,
        ..GridCfg::default()
    })
    .unwrap();
    let mut fm = FastMarching::new(&m, FastMarchingCfg::default(), &Boundary::from_seeds([40]))
        .unwrap();
    let mut last = 0.0;
    let mut steps = 0;
    while let Some(p) = fm.step() {
        let t = fm.arrival_time(p).unwrap();
        assert!(t + 1e-12 >= last, "accepted {t} after {last}");
        assert_eq!(fm.status(p), Status::Accepted);
        last = t;
        steps += 1;
    }
    assert_eq!(steps + 1, m.num_points());
    assert_eq!(fm.accepted_count(), m.num_points());
    assert_eq!(fm.considered_count(), 0);
}

#[test]
fn solution_attaches_to_a_copy_of_the_mesh() {
    let m = unit_square().with_point_array("keep", vec![7.0; 4]).unwrap();
    let cfg = FastMarchingCfg {
        solution_array_name: "T".into(),
        ..FastMarchingCfg::default()
    };
    let sol = solve_eikonal(&m, cfg, &Boundary::from_seeds([0])).unwrap();
    let out = sol.attach_to(&m).unwrap();
    assert_eq!(out.point_array("keep"), Some(&[7.0; 4][..]));
    assert_eq!(out.point_array("T"), Some(sol.values.as_slice()));
    assert!(m.point_array("T").is_none());
}
