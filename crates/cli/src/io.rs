//! File formats: JSON meshes and results via serde, point tables via polars.

use anyhow::{bail, Context, Result};
use centerline::api::{Centerlines, EikonalSolution, PolyMesh};
use centerline::Vec3;
use polars::prelude::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Polygonal mesh on disk: points, cells as point-id lists, named point arrays.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MeshFile {
    pub points: Vec<[f64; 3]>,
    pub cells: Vec<Vec<usize>>,
    #[serde(default)]
    pub point_data: BTreeMap<String, Vec<f64>>,
}

impl MeshFile {
    pub fn from_mesh(mesh: &PolyMesh) -> Self {
        Self {
            points: mesh.points().iter().map(|p| [p.x, p.y, p.z]).collect(),
            cells: mesh.cells().to_vec(),
            point_data: mesh.point_arrays().clone(),
        }
    }

    pub fn into_mesh(self) -> Result<PolyMesh> {
        let points = self.points.iter().map(|&[x, y, z]| Vec3::new(x, y, z)).collect();
        let mut mesh = PolyMesh::new(points, self.cells)?;
        for (name, values) in self.point_data {
            mesh.add_point_array(name, values)?;
        }
        Ok(mesh)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SolutionFile {
    pub name: String,
    pub values: Vec<f64>,
    pub accepted: usize,
    pub unreached: usize,
}

impl From<&EikonalSolution> for SolutionFile {
    fn from(sol: &EikonalSolution) -> Self {
        Self {
            name: sol.name.clone(),
            values: sol.values.clone(),
            accepted: sol.accepted,
            unreached: sol.unreached,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CenterlinesFile {
    pub points: Vec<[f64; 3]>,
    pub lines: Vec<Vec<usize>>,
    pub radius_name: String,
    pub radius: Vec<f64>,
    pub hit_targets: Vec<usize>,
}

impl From<&Centerlines> for CenterlinesFile {
    fn from(c: &Centerlines) -> Self {
        Self {
            points: c.lines.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
            lines: c.lines.lines.clone(),
            radius_name: c.radius_name.clone(),
            radius: c.radius.clone(),
            hit_targets: c.hit_targets.clone(),
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("writing {}", path.display()))
}

pub fn read_mesh(path: &Path) -> Result<PolyMesh> {
    read_json::<MeshFile>(path)?
        .into_mesh()
        .with_context(|| format!("building mesh from {}", path.display()))
}

/// One row per centerline point: line, index along the line, coordinates, radius.
pub fn points_frame(c: &Centerlines) -> Result<DataFrame> {
    let mut line = Vec::new();
    let mut index = Vec::new();
    let (mut x, mut y, mut z, mut r) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for (k, ids) in c.lines.lines.iter().enumerate() {
        for (i, &id) in ids.iter().enumerate() {
            let p = c.lines.points[id];
            line.push(k as u32);
            index.push(i as u32);
            x.push(p.x);
            y.push(p.y);
            z.push(p.z);
            r.push(c.radius[id]);
        }
    }
    let df = df!(
        "line" => line,
        "index" => index,
        "x" => x,
        "y" => y,
        "z" => z,
        "radius" => r
    )?;
    Ok(df)
}

/// Write a table as CSV or Parquet, chosen by extension.
pub fn write_table(path: &Path, df: &mut DataFrame) -> Result<()> {
    ensure_parent(path)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => CsvWriter::new(&mut file).include_header(true).finish(df)?,
        Some("parquet") => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        other => bail!("unsupported table extension {other:?} (use .csv or .parquet)"),
    }
    Ok(())
}

pub fn scan_table(path: &Path) -> Result<LazyFrame> {
    let lf = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?,
        Some("parquet") => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        other => bail!("unsupported table extension {other:?} (use .csv or .parquet)"),
    };
    Ok(lf)
}

/// Per-line point count, mean and minimum radius of a point table.
pub fn line_stats(lf: LazyFrame) -> Result<DataFrame> {
    let df = lf
        .group_by([col("line")])
        .agg([
            len().alias("points"),
            col("radius").mean().alias("mean_radius"),
            col("radius").min().alias("min_radius"),
        ])
        .sort_by_exprs([col("line")], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating dir {}", parent.display()))?;
        }
    }
    Ok(())
}
