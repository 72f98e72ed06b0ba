//! Position features derived from detection polygons

use super::detection::Detection;

/// Scalar position of one detection, used for line assembly
#[derive(Debug, Clone, PartialEq)]
pub struct TextPosition {
    /// Recognized text
    pub text: String,
    /// Mean y over the polygon corners
    pub center_y: f64,
    /// Smallest x over the polygon corners
    pub left_x: f64,
    /// Vertical extent of the polygon
    pub height: f64,
}

impl TextPosition {
    /// Derive the position features of a single detection
    pub fn from_detection(detection: &Detection) -> Self {
        let polygon = detection.polygon();

        let sum_y: f64 = polygon.iter().map(|p| p.y).sum();
        let min_x = polygon.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = polygon.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = polygon.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Self {
            text: detection.text().to_string(),
            center_y: sum_y / polygon.len() as f64,
            left_x: min_x,
            height: max_y - min_y,
        }
    }
}

/// Extract position features, one per detection, in input order
pub fn extract(detections: &[Detection]) -> Vec<TextPosition> {
    detections.iter().map(TextPosition::from_detection).collect()
}
