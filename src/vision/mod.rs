//! Vision Layer
//!
//! Consumes OCR engine output: typed detections, their position features and
//! the reading-order text rebuilt from them.

pub mod detection;
pub mod geometry;
pub mod lines;
pub mod ocr;

pub use detection::{Detection, Point, RawDetection};
pub use geometry::{extract, TextPosition};
pub use lines::{reconstruct, DEFAULT_LINE_THRESHOLD_FACTOR};
pub use ocr::{format_results, load_detections, DetectionFile, StaticDetector, TextDetector};
