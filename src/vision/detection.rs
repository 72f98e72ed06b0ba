//! Detection records produced by the OCR engine
//!
//! Engine output arrives as loosely typed (polygon, text, confidence) tuples.
//! They are validated once here and carried as immutable [`Detection`]s from
//! then on.

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Number of corners in a detection polygon
pub const POLYGON_POINTS: usize = 4;

/// A point in image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// One OCR engine result: a quadrilateral, its text and a confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    polygon: [Point; POLYGON_POINTS],
    text: String,
    confidence: f64,
}

impl Detection {
    /// Create a validated detection
    ///
    /// Every coordinate must be finite and the confidence must lie in `[0, 1]`.
    /// Degenerate polygons (all corners equal) are accepted.
    pub fn new(
        polygon: [Point; POLYGON_POINTS],
        text: impl Into<String>,
        confidence: f64,
    ) -> Result<Self> {
        if let Some(p) = polygon.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(PipelineError::InvalidDetection(format!(
                "non-finite polygon point ({}, {})",
                p.x, p.y
            )));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(PipelineError::InvalidDetection(format!(
                "confidence {} outside [0, 1]",
                confidence
            )));
        }

        Ok(Self {
            polygon,
            text: text.into(),
            confidence,
        })
    }

    /// Convert an untyped engine tuple, checking the polygon has four corners
    pub fn from_raw(polygon: Vec<(f64, f64)>, text: impl Into<String>, confidence: f64) -> Result<Self> {
        let count = polygon.len();
        let points: Vec<Point> = polygon.into_iter().map(Point::from).collect();
        let polygon: [Point; POLYGON_POINTS] = points.try_into().map_err(|_| {
            PipelineError::InvalidDetection(format!(
                "polygon has {} points, expected {}",
                count, POLYGON_POINTS
            ))
        })?;
        Self::new(polygon, text, confidence)
    }

    /// Create an axis-aligned detection from a top-left corner and a size
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64, text: impl Into<String>, confidence: f64) -> Result<Self> {
        Self::new(
            [
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
            ],
            text,
            confidence,
        )
    }

    /// Polygon corners in engine order
    pub fn polygon(&self) -> &[Point; POLYGON_POINTS] {
        &self.polygon
    }

    /// Recognized text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Recognition confidence (0.0 - 1.0)
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Serialized form of a detection as written by OCR engines
#[derive(Debug, Clone, Deserialize)]
pub struct RawDetection {
    pub polygon: Vec<[f64; 2]>,
    pub text: String,
    pub confidence: f64,
}

impl TryFrom<RawDetection> for Detection {
    type Error = PipelineError;

    fn try_from(raw: RawDetection) -> Result<Self> {
        let polygon = raw.polygon.into_iter().map(|[x, y]| (x, y)).collect();
        Detection::from_raw(polygon, raw.text, raw.confidence)
    }
}
