//! Heatmap tool: reads a survey grid, prints the uniformity summary and
//! writes the banded moisture map over the survey photo as PNG.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dulq_core::{
    interpolate_with, summarize, DulqError, Grid, HeatmapConfig, Method, Resolution, ScalarField,
};
use dulq_render::{draw_grid, draw_legend, encode_png, load_background, render_heatmap, OverlayOptions};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "heatmap", about = "Render a moisture heatmap and DUlq summary from survey readings")]
struct Args {
    /// Grid JSON: {"rows","cols","cells":[..]} or {"rows","cols","readings":[{"row","col","value"}]}
    #[arg(short, long)]
    grid: PathBuf,

    /// Survey photo to draw the heatmap on (white canvas if omitted).
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Heatmap config JSON; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lattice points per axis.
    #[arg(short, long)]
    resolution: Option<usize>,

    /// Interpolation method: cubic or linear.
    #[arg(short, long)]
    method: Option<Method>,

    /// Retry with linear interpolation if the readings are collinear.
    #[arg(long)]
    fallback_linear: bool,

    /// Draw the survey grid lines on top of the heatmap.
    #[arg(long)]
    grid_lines: bool,

    /// Draw the band colour legend at the right edge.
    #[arg(long)]
    legend: bool,

    /// Also write the summary statistics as JSON here.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Output PNG path.
    #[arg(short, long, default_value = "heatmap.png")]
    output: PathBuf,
}

// ── Input schema ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Reading {
    row: usize,
    col: usize,
    value: f64,
}

#[derive(Deserialize)]
struct SparseGrid {
    rows: usize,
    cols: usize,
    readings: Vec<Reading>,
}

/// Parse a dense (`cells`) or sparse (`readings`) grid file. The shape is
/// picked by key so validation errors from either form reach the user.
fn parse_grid(text: &str) -> Result<Grid> {
    let value: serde_json::Value = serde_json::from_str(text).context("grid file is not JSON")?;
    if value.get("readings").is_some() {
        let sparse: SparseGrid = serde_json::from_value(value).context("invalid sparse grid")?;
        let readings = sparse.readings.into_iter().map(|r| ((r.row, r.col), r.value));
        Ok(Grid::from_readings(sparse.rows, sparse.cols, readings)?)
    } else {
        Ok(serde_json::from_value(value).context("invalid grid")?)
    }
}

/// Interpolate with the configured method, retrying with linear when the
/// readings are collinear and `fallback_linear` is set.
fn interpolate_field(
    grid: &Grid,
    config: &HeatmapConfig,
    fallback_linear: bool,
) -> dulq_core::Result<ScalarField> {
    match interpolate_with(grid, config.resolution, config.method) {
        Err(DulqError::DegenerateGeometry(reason)) if fallback_linear && config.method == Method::Cubic => {
            warn!(%reason, "cubic interpolation impossible; retrying with linear");
            interpolate_with(grid, config.resolution, Method::Linear)
        }
        other => other,
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    setup_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => HeatmapConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HeatmapConfig::default(),
    };
    if let Some(n) = args.resolution {
        config.resolution = Resolution::square(n);
    }
    if let Some(method) = args.method {
        config.method = method;
    }
    config.validate().context("invalid heatmap settings")?;

    let text = fs::read_to_string(&args.grid)
        .with_context(|| format!("reading grid {}", args.grid.display()))?;
    let grid = parse_grid(&text).with_context(|| format!("parsing grid {}", args.grid.display()))?;
    info!(
        rows = grid.rows(),
        cols = grid.cols(),
        readings = grid.reading_count(),
        "loaded grid"
    );

    let summary = summarize(&grid).context("cannot summarise readings")?;
    println!("{summary}");
    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    let field =
        interpolate_field(&grid, &config, args.fallback_linear).context("interpolation failed")?;

    let background = match &args.image {
        Some(path) => Some(
            load_background(path).with_context(|| format!("loading image {}", path.display()))?,
        ),
        None => None,
    };
    let options = OverlayOptions {
        alpha: config.overlay_alpha,
        canvas: config.canvas,
    };
    let mut img = render_heatmap(&field, &config.bands, background.as_ref(), &options);
    if args.grid_lines {
        draw_grid(&mut img, grid.rows(), grid.cols(), config.grid_line_color)?;
    }
    if args.legend {
        draw_legend(&mut img, &config.bands);
    }

    let bytes = encode_png(&img)?;
    fs::write(&args.output, bytes).with_context(|| format!("writing {}", args.output.display()))?;
    info!("Wrote {}", args.output.display());
    Ok(())
}
