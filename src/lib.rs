//! OCR text detector core
//!
//! Turns OCR detections (polygon, text, confidence) into reading-order text
//! and an annotated RGBA texture ready for display upload.

pub mod app;
pub mod config;
pub mod error;
pub mod raster;
pub mod render;
pub mod shared;
pub mod storage;
pub mod vision;

pub use app::{Pipeline, ProcessingCoordinator, TextureResult};
pub use error::{PipelineError, Result};
