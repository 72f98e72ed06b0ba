//! Error types for the detection pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pipeline components
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Could not read image {path:?}: {reason}")]
    ImageRead { path: PathBuf, reason: String },

    #[error("Could not write image {path:?}: {reason}")]
    ImageWrite { path: PathBuf, reason: String },

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Unsupported channel count: {0} (expected 3 or 4)")]
    UnsupportedChannels(u8),

    #[error("Invalid annotation parameter: {0}")]
    InvalidAnnotationParameter(String),

    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    #[error("Detection source error: {0}")]
    DetectionSource(String),
}

impl PipelineError {
    pub(crate) fn image_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ImageRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
