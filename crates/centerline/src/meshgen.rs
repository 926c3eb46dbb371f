//! Reproducible meshes for tests, benches and demos.
//!
//! Purpose
//! - Planar triangulated grids (optionally jittered), polar disks with quad
//!   cells, quad ribbons carrying a radius ridge, and polyline chains.
//! - Everything is deterministic: jitter draws from a `StdRng` seeded by the
//!   config, so a `(cfg, seed)` pair always yields the same mesh.
//!
//! Model
//! - Grid point `(i, j)` has id `j * nx + i`; each grid square is split along
//!   its `(i, j)–(i+1, j+1)` diagonal.
//! - Disk: center id 0, ring `k ≥ 1` at radius `k * ring_spacing` with
//!   `sectors` points; quads between rings, triangles around the center.
//! - Ribbon: quads over `[0, length] × [-half_width, half_width]` with
//!   `R(y) = half_width - |y| + floor` stored under the default radius name.

use std::f64::consts::PI;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::centerlines::DEFAULT_RADIUS_ARRAY_NAME;
use crate::mesh::{MeshError, PointId, PolyMesh};

/// Planar grid configuration.
#[derive(Clone, Copy, Debug)]
pub struct GridCfg {
    pub nx: usize,
    pub ny: usize,
    pub spacing: f64,
    /// Interior points move by up to `jitter * spacing` in x and y. Clamped to [0, 0.3].
    pub jitter: f64,
    pub seed: u64,
}

impl Default for GridCfg {
    fn default() -> Self {
        Self {
            nx: 11,
            ny: 11,
            spacing: 1.0,
            jitter: 0.0,
            seed: 0,
        }
    }
}

impl GridCfg {
    #[inline]
    pub fn id(&self, i: usize, j: usize) -> PointId {
        j * self.nx + i
    }
}

/// Triangulated grid in the `z = 0` plane.
pub fn grid(cfg: GridCfg) -> Result<PolyMesh, MeshError> {
    let nx = cfg.nx.max(2);
    let ny = cfg.ny.max(2);
    let cfg = GridCfg { nx, ny, ..cfg };
    let amp = cfg.jitter.clamp(0.0, 0.3) * cfg.spacing;
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let mut points = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let mut p = Vector3::new(i as f64 * cfg.spacing, j as f64 * cfg.spacing, 0.0);
            let interior = i > 0 && j > 0 && i + 1 < nx && j + 1 < ny;
            if interior && amp > 0.0 {
                p.x += rng.gen_range(-amp..=amp);
                p.y += rng.gen_range(-amp..=amp);
            }
            points.push(p);
        }
    }
    let mut cells = Vec::with_capacity(2 * (nx - 1) * (ny - 1));
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let a = cfg.id(i, j);
            let b = cfg.id(i + 1, j);
            let c = cfg.id(i + 1, j + 1);
            let d = cfg.id(i, j + 1);
            cells.push(vec![a, b, c]);
            cells.push(vec![a, c, d]);
        }
    }
    PolyMesh::new(points, cells)
}

/// Polar disk configuration.
#[derive(Clone, Copy, Debug)]
pub struct DiskCfg {
    pub rings: usize,
    pub sectors: usize,
    pub ring_spacing: f64,
}

impl Default for DiskCfg {
    fn default() -> Self {
        Self {
            rings: 8,
            sectors: 32,
            ring_spacing: 1.0,
        }
    }
}

impl DiskCfg {
    /// Id of sector `s` on ring `k ≥ 1`.
    #[inline]
    pub fn id(&self, k: usize, s: usize) -> PointId {
        1 + (k - 1) * self.sectors + s % self.sectors
    }
}

/// Disk around the origin: a triangle fan around the center, quads outside.
pub fn disk(cfg: DiskCfg) -> Result<PolyMesh, MeshError> {
    let cfg = DiskCfg {
        rings: cfg.rings.max(1),
        sectors: cfg.sectors.max(3),
        ..cfg
    };
    let mut points = vec![Vector3::zeros()];
    for k in 1..=cfg.rings {
        let r = k as f64 * cfg.ring_spacing;
        for s in 0..cfg.sectors {
            let phi = 2.0 * PI * s as f64 / cfg.sectors as f64;
            points.push(Vector3::new(r * phi.cos(), r * phi.sin(), 0.0));
        }
    }
    let mut cells = Vec::new();
    for s in 0..cfg.sectors {
        cells.push(vec![0, cfg.id(1, s), cfg.id(1, s + 1)]);
    }
    for k in 1..cfg.rings {
        for s in 0..cfg.sectors {
            cells.push(vec![
                cfg.id(k, s),
                cfg.id(k + 1, s),
                cfg.id(k + 1, s + 1),
                cfg.id(k, s + 1),
            ]);
        }
    }
    PolyMesh::new(points, cells)
}

/// Quad ribbon configuration.
#[derive(Clone, Copy, Debug)]
pub struct RibbonCfg {
    pub length: f64,
    pub half_width: f64,
    /// Quads along x.
    pub segments: usize,
    /// Quads on each side of the axis.
    pub rows: usize,
    /// Radius at the rim; keeps the cost `1/R` finite.
    pub floor: f64,
}

impl Default for RibbonCfg {
    fn default() -> Self {
        Self {
            length: 10.0,
            half_width: 1.0,
            segments: 20,
            rows: 3,
            floor: 0.05,
        }
    }
}

impl RibbonCfg {
    #[inline]
    fn columns(&self) -> usize {
        2 * self.rows.max(1) + 1
    }

    /// Id of point `i` (along x) in row `j` (`0..=2 rows`, axis at `rows`).
    #[inline]
    pub fn id(&self, i: usize, j: usize) -> PointId {
        i * self.columns() + j
    }

    /// Id of the axis point at column `i`.
    #[inline]
    pub fn axis_id(&self, i: usize) -> PointId {
        self.id(i, self.rows.max(1))
    }

    /// Axis points at both ends: `(x = 0, x = length)`.
    pub fn axis_ends(&self) -> (PointId, PointId) {
        (self.axis_id(0), self.axis_id(self.segments.max(1)))
    }
}

/// Ribbon with the radius ridge attached as a point array.
pub fn ribbon(cfg: RibbonCfg) -> Result<PolyMesh, MeshError> {
    let segments = cfg.segments.max(1);
    let rows = cfg.rows.max(1);
    let cols = cfg.columns();
    let dx = cfg.length / segments as f64;
    let dy = cfg.half_width / rows as f64;

    let mut points = Vec::with_capacity((segments + 1) * cols);
    let mut radius = Vec::with_capacity((segments + 1) * cols);
    for i in 0..=segments {
        for j in 0..cols {
            let y = (j as f64 - rows as f64) * dy;
            points.push(Vector3::new(i as f64 * dx, y, 0.0));
            radius.push(cfg.half_width - y.abs() + cfg.floor);
        }
    }
    let mut cells = Vec::with_capacity(segments * (cols - 1));
    for i in 0..segments {
        for j in 0..cols - 1 {
            cells.push(vec![
                cfg.id(i, j),
                cfg.id(i + 1, j),
                cfg.id(i + 1, j + 1),
                cfg.id(i, j + 1),
            ]);
        }
    }
    PolyMesh::new(points, cells)?.with_point_array(DEFAULT_RADIUS_ARRAY_NAME, radius)
}

/// Points on the x axis joined by 2-point line cells.
pub fn chain(xs: &[f64]) -> Result<PolyMesh, MeshError> {
    let points = xs.iter().map(|&x| Vector3::new(x, 0.0, 0.0)).collect();
    let cells = (1..xs.len()).map(|i| vec![i - 1, i]).collect();
    PolyMesh::new(points, cells)
}
