//! OCR Text Detector - command line front end
//!
//! Loads an image and the detections an OCR engine produced for it, then
//! prints the text in reading order and optionally saves the annotated image.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ocr_text_detector::config::{self, AppConfig};
use ocr_text_detector::vision::{format_results, load_detections, DetectionFile};
use ocr_text_detector::{Pipeline, ProcessingCoordinator};

/// OCR Text Detector - reading-order text and annotated previews from OCR output
#[derive(Parser, Debug)]
#[command(name = "ocr-text-detector")]
#[command(about = "Rebuild reading-order text and an annotated image from OCR detections")]
struct Args {
    /// Image the detections belong to (PNG, JPG, JPEG)
    image: PathBuf,

    /// JSON file with the OCR engine's detections
    #[arg(short, long)]
    detections: PathBuf,

    /// Configuration file (defaults to config.toml in the config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the annotated image to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Display width used to size the preview
    #[arg(long)]
    display_width: Option<u32>,

    /// Line merge threshold as a fraction of the average text height
    #[arg(long)]
    threshold: Option<f64>,

    /// Print each detection with its confidence
    #[arg(long)]
    print_results: bool,

    /// Seconds to wait for processing before giving up
    #[arg(long, default_value = "300")]
    timeout: u64,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => config::load_or_default(),
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    let detector = Arc::new(DetectionFile::new(&args.detections));
    if args.print_results {
        let detections = load_detections(detector.path())?;
        print!("{}", format_results(&detections));
    }

    let target_width = config.display.target_width;
    let mut coordinator = ProcessingCoordinator::new(Pipeline::new(detector, config));

    info!("Processing {:?}", args.image);
    coordinator.submit(&args.image);
    if coordinator.wait(Duration::from_secs(args.timeout)).is_none() {
        bail!("Processing did not finish within {} seconds", args.timeout);
    }

    let state = coordinator.state();
    let state = state.read();

    if let Some(error) = &state.last_error {
        bail!("{}", error);
    }

    if state.text.is_empty() {
        warn!("No text detected");
    } else {
        println!("{}", state.text);
    }

    if let Some(texture) = &state.texture {
        let (width, height) = texture.dimensions();
        info!("Texture size: {}x{}", width, height);
    }
    if let Some((width, height)) = state.display_size(target_width)? {
        info!("Preview size: {}x{}", width, height);
    }

    if let (Some(output), Some(annotated)) = (&args.output, &state.annotated) {
        annotated
            .save(output)
            .with_context(|| format!("Failed to save annotated image to {:?}", output))?;
        info!("Result saved to: {:?}", output);
    }

    Ok(())
}

/// Command line values take precedence over the configuration file
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(width) = args.display_width {
        config.display.target_width = width;
    }
    if let Some(threshold) = args.threshold {
        config.text.line_threshold_factor = threshold;
    }
}
