//! OCR engine boundary
//!
//! The recognition model itself lives outside this crate. Anything that can
//! map a pixel buffer to detections implements [`TextDetector`]; the bundled
//! [`DetectionFile`] replays detections an engine wrote to JSON.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::detection::{Detection, RawDetection};
use crate::error::{PipelineError, Result};
use crate::raster::PixelBuffer;

/// Text detection and recognition engine
pub trait TextDetector: Send + Sync {
    /// Detect text regions in an image
    fn detect(&self, image: &PixelBuffer) -> Result<Vec<Detection>>;
}

/// Detector that returns a fixed set of detections for every image
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detections: Vec<Detection>,
}

impl StaticDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl TextDetector for StaticDetector {
    fn detect(&self, _image: &PixelBuffer) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

/// Detector backed by a JSON file of precomputed engine output
///
/// The file holds an array of `{"polygon": [[x, y], ...], "text": ..., "confidence": ...}`
/// objects. It is read on every call so a rerun picks up a rewritten file.
#[derive(Debug, Clone)]
pub struct DetectionFile {
    path: PathBuf,
}

impl DetectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextDetector for DetectionFile {
    fn detect(&self, image: &PixelBuffer) -> Result<Vec<Detection>> {
        let detections = load_detections(&self.path)?;

        let (width, height) = (image.width as f64, image.height as f64);
        let outside = detections
            .iter()
            .filter(|d| {
                d.polygon()
                    .iter()
                    .any(|p| p.x < 0.0 || p.y < 0.0 || p.x > width || p.y > height)
            })
            .count();
        if outside > 0 {
            debug!("{} detections extend past the {}x{} image", outside, image.width, image.height);
        }

        Ok(detections)
    }
}

/// Load detections from a JSON file
pub fn load_detections(path: &Path) -> Result<Vec<Detection>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::DetectionSource(format!("{:?}: {}", path, e)))?;
    let detections = parse_detections(&content)?;
    info!("Loaded {} detections from {:?}", detections.len(), path);
    Ok(detections)
}

/// Parse and validate a JSON array of detections
pub fn parse_detections(json: &str) -> Result<Vec<Detection>> {
    let raw: Vec<RawDetection> =
        serde_json::from_str(json).map_err(|e| PipelineError::DetectionSource(e.to_string()))?;

    raw.into_iter()
        .enumerate()
        .map(|(i, r)| {
            Detection::try_from(r).map_err(|e| match e {
                PipelineError::InvalidDetection(msg) => {
                    PipelineError::InvalidDetection(format!("entry {}: {}", i, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Numbered listing of detected text with confidence percentages
pub fn format_results(detections: &[Detection]) -> String {
    let mut out = String::from("\n--- Detected Text ---\n");
    for (i, detection) in detections.iter().enumerate() {
        out.push_str(&format!(
            "{}. Text: '{}' (Confidence: {:.2}%)\n",
            i + 1,
            detection.text(),
            detection.confidence() * 100.0
        ));
    }
    out.push_str("---------------------\n");
    out
}
