mod annotations;
mod config;
mod error;
mod image_utils;
mod object_detection;
mod stitching;

use anyhow::{Context, Result};
use clap::Parser;
use config::StitchConfig;
use image_utils::contour::OtsuContourExtractor;
use image_utils::image_io::FileTileLoader;
use object_detection::onnx_detector::OnnxDetector;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use stitching::TileStitcher;
use stitching::report::write_report;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "defect_stitcher=info,ort=warn";

/// Stitch per-tile defect detections into one de-duplicated report in global coordinates.
#[derive(Debug, Parser)]
#[command(name = "defect-stitcher")]
#[command(version)]
struct Cli {
    /// JSON config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory tile names are resolved against.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// ONNX detector model.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Tile to process, in order. Repeat for more tiles. Defaults to every image in the
    /// input directory.
    #[arg(long = "tile")]
    tiles: Vec<String>,

    /// Model input width in pixels.
    #[arg(long)]
    input_width: Option<u32>,

    /// Model input height in pixels.
    #[arg(long)]
    input_height: Option<u32>,

    /// Minimum confidence (exclusive) for a candidate to be kept.
    #[arg(long)]
    score_threshold: Option<f32>,

    /// IoU at or above which overlapping candidates are merged.
    #[arg(long)]
    nms_threshold: Option<f32>,

    /// Global x offset per tile ordinal, in pixels.
    #[arg(long)]
    step_size: Option<u32>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    fn resolve_config(&self) -> Result<StitchConfig> {
        let mut config = match &self.config {
            Some(path) => StitchConfig::load(path)?,
            None => StitchConfig::default(),
        };
        if let Some(input_dir) = &self.input_dir {
            config.input_dir = input_dir.clone();
        }
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if !self.tiles.is_empty() {
            config.tiles = Some(self.tiles.clone());
        }
        if let Some(width) = self.input_width {
            config.input_width = width;
        }
        if let Some(height) = self.input_height {
            config.input_height = height;
        }
        if let Some(threshold) = self.score_threshold {
            config.score_threshold = threshold;
        }
        if let Some(threshold) = self.nms_threshold {
            config.nms_threshold = threshold;
        }
        if let Some(step) = self.step_size {
            config.step_size = step;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config().context("invalid configuration")?;
    info!(
        input_dir = ?config.input_dir,
        model = ?config.model_path,
        input = %format!("{}x{}", config.input_width, config.input_height),
        score_threshold = config.score_threshold,
        nms_threshold = config.nms_threshold,
        step_size = config.step_size,
        "configuration loaded"
    );

    let detector = OnnxDetector::new(&config.model_path, config.input_width, config.input_height)
        .context("failed to initialise detector")?;
    info!("detector ready");

    let tiles = config.tile_manifest().context("failed to build tile list")?;
    info!(tiles = tiles.len(), "tile list ready");

    let loader = FileTileLoader::new(&config.input_dir);
    let stitcher = TileStitcher::new(detector, OtsuContourExtractor, config);
    let defects = stitcher.run(&tiles, &loader)?;

    match &cli.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create report file {path:?}"))?;
            write_report(&defects, BufWriter::new(file))?;
            info!(path = ?path, defects = defects.len(), "report written");
        }
        None => write_report(&defects, io::stdout().lock())?,
    }
    Ok(())
}
