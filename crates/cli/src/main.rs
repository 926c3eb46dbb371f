use anyhow::{Context, Result};
use centerline::api::{
    extract_centerlines, ribbon, solve_eikonal, Boundary, CenterlineParams, CostFunction,
    FastMarchingCfg, PolyMesh, RibbonCfg, SpeedModel, DEFAULT_RADIUS_ARRAY_NAME,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod io;
mod provenance;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Fast Marching and centerline extraction on polygonal meshes")]
struct Cmd {
    /// Optional run identifier; propagated to provenance sidecars
    #[arg(long)]
    run_id: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Arrival times from seed points
    Eikonal {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_delimiter = ',', required = true)]
        seeds: Vec<usize>,
        /// Point array holding the inverse speed; unit speed when absent
        #[arg(long)]
        cost_array: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        regularization: f64,
        /// Also try the larger quadratic root in triangle updates
        #[arg(long)]
        larger_root: bool,
        #[arg(long, default_value = "data/eikonal.json")]
        out: PathBuf,
    },
    /// Centerlines from sources to targets on a Voronoi mesh with radii
    Centerlines {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_delimiter = ',', required = true)]
        sources: Vec<usize>,
        #[arg(long, value_delimiter = ',', required = true)]
        targets: Vec<usize>,
        #[arg(long, default_value = DEFAULT_RADIUS_ARRAY_NAME)]
        radius_array: String,
        /// Cost exponent p in R^-p
        #[arg(long, default_value_t = 1.0)]
        power: f64,
        #[arg(long)]
        resample: Option<f64>,
        #[arg(long)]
        out: PathBuf,
        /// Point table (.csv or .parquet)
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Ribbon mesh through the full pipeline
    Demo {
        #[arg(long, default_value_t = 10.0)]
        length: f64,
        #[arg(long, default_value_t = 1.0)]
        half_width: f64,
        #[arg(long, default_value_t = 40)]
        segments: usize,
        #[arg(long)]
        resample: Option<f64>,
        #[arg(long, default_value = "data/demo/lines.json")]
        out: PathBuf,
        /// Also write the generated mesh
        #[arg(long)]
        mesh_out: Option<PathBuf>,
    },
    /// Per-line statistics of a point table
    Stats {
        #[arg(long)]
        table: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Eikonal {
            input,
            seeds,
            cost_array,
            regularization,
            larger_root,
            out,
        } => eikonal(
            input,
            seeds,
            cost_array,
            regularization,
            larger_root,
            out,
            cmd.run_id,
        ),
        Action::Centerlines {
            input,
            sources,
            targets,
            radius_array,
            power,
            resample,
            out,
            table,
        } => {
            let params = CenterlineParams {
                radius_array,
                cost: cost_function(power),
                resampling_step: resample,
                ..CenterlineParams::default()
            };
            let mesh = io::read_mesh(&input)?;
            let params_json = json!({
                "input": input,
                "sources": sources,
                "targets": targets,
                "radius_array": params.radius_array,
                "power": power,
                "resample": resample,
            });
            run_centerlines(
                &mesh,
                &sources,
                &targets,
                &params,
                &out,
                table,
                params_json,
                cmd.run_id,
            )
        }
        Action::Demo {
            length,
            half_width,
            segments,
            resample,
            out,
            mesh_out,
        } => demo(length, half_width, segments, resample, out, mesh_out, cmd.run_id),
        Action::Stats { table } => stats(table),
        Action::Report => report(cmd.run_id),
    }
}

fn cost_function(power: f64) -> CostFunction {
    if power == 1.0 {
        CostFunction::InverseRadius
    } else {
        CostFunction::InversePower(power)
    }
}

fn eikonal(
    input: PathBuf,
    seeds: Vec<usize>,
    cost_array: Option<String>,
    regularization: f64,
    larger_root: bool,
    out: PathBuf,
    run_id: Option<String>,
) -> Result<()> {
    tracing::info!(input = %input.display(), ?seeds, "eikonal");
    let mesh = io::read_mesh(&input)?;
    let cfg = FastMarchingCfg {
        speed: cost_array
            .clone()
            .map_or(SpeedModel::Unit, SpeedModel::CostArray),
        regularization,
        search_larger_root: larger_root,
        ..FastMarchingCfg::default()
    };
    let sol = solve_eikonal(&mesh, cfg, &Boundary::from_seeds(seeds.clone()))
        .context("fast marching")?;
    tracing::info!(
        accepted = sol.accepted,
        unreached = sol.unreached,
        "eikonal_done"
    );
    io::write_json(&out, &io::SolutionFile::from(&sol))?;
    write_sidecar(
        &out,
        Payload::new(
            json!({
                "input": input,
                "seeds": seeds,
                "cost_array": cost_array,
                "regularization": regularization,
                "larger_root": larger_root,
            }),
            run_id,
        ),
    )?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_centerlines(
    mesh: &PolyMesh,
    sources: &[usize],
    targets: &[usize],
    params: &CenterlineParams,
    out: &Path,
    table: Option<PathBuf>,
    params_json: serde_json::Value,
    run_id: Option<String>,
) -> Result<()> {
    tracing::info!(?sources, ?targets, out = %out.display(), "centerlines");
    let lines = extract_centerlines(mesh, sources, targets, params).context("centerlines")?;
    if !lines.all_targets_hit(targets.len()) {
        tracing::warn!(
            hit = lines.hit_targets.len(),
            targets = targets.len(),
            "some targets did not reach a source"
        );
    }
    tracing::info!(
        lines = lines.lines.num_lines(),
        points = lines.lines.num_points(),
        "centerlines_done"
    );
    io::write_json(out, &io::CenterlinesFile::from(&lines))?;
    write_sidecar(out, Payload::new(params_json.clone(), run_id.clone()))?;
    if let Some(table) = table {
        let mut df = io::points_frame(&lines)?;
        io::write_table(&table, &mut df)?;
        write_sidecar(&table, Payload::new(params_json, run_id))?;
    }
    Ok(())
}

fn demo(
    length: f64,
    half_width: f64,
    segments: usize,
    resample: Option<f64>,
    out: PathBuf,
    mesh_out: Option<PathBuf>,
    run_id: Option<String>,
) -> Result<()> {
    let cfg = RibbonCfg {
        length,
        half_width,
        segments,
        ..RibbonCfg::default()
    };
    let mesh = ribbon(cfg)?;
    if let Some(path) = &mesh_out {
        io::write_json(path, &io::MeshFile::from_mesh(&mesh))?;
    }
    let (source, target) = cfg.axis_ends();
    let params = CenterlineParams {
        resampling_step: resample,
        ..CenterlineParams::default()
    };
    let params_json = json!({
        "ribbon": {"length": length, "half_width": half_width, "segments": segments},
        "resample": resample,
    });
    let stem = out
        .file_stem()
        .map_or_else(|| "lines".to_string(), |s| s.to_string_lossy().into_owned());
    let table = out.with_file_name(format!("{stem}_points.csv"));
    run_centerlines(
        &mesh,
        &[source],
        &[target],
        &params,
        &out,
        Some(table),
        params_json,
        run_id,
    )
}

fn stats(table: PathBuf) -> Result<()> {
    let df = io::line_stats(io::scan_table(&table)?)
        .with_context(|| format!("summarizing {}", table.display()))?;
    tracing::info!(rows = df.height(), "line_stats");
    println!("{df}");
    Ok(())
}

fn report(run_id: Option<String>) -> Result<()> {
    let obj = provenance::report_block(run_id)?;
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
