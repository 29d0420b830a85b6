//! Draws the survey grid on a photo so each reading can be matched to a cell.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dulq_render::{draw_grid, encode_png, load_background};

#[derive(Parser, Debug)]
#[command(name = "grid_overlay", about = "Overlay a rows × cols survey grid on an image")]
struct Args {
    /// Survey photo.
    #[arg(short, long)]
    image: PathBuf,

    #[arg(short, long, default_value = "15")]
    rows: usize,

    #[arg(short, long, default_value = "15")]
    cols: usize,

    /// Output PNG path.
    #[arg(short, long, default_value = "grid.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let mut img = load_background(&args.image)
        .with_context(|| format!("loading image {}", args.image.display()))?;
    draw_grid(&mut img, args.rows, args.cols, [0, 0, 0])?;

    fs::write(&args.output, encode_png(&img)?)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(rows = args.rows, cols = args.cols, "Wrote {}", args.output.display());
    Ok(())
}
