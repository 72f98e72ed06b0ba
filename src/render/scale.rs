//! Aspect-preserving display sizing

use crate::error::{PipelineError, Result};

/// Height that keeps the source aspect ratio at `target_width`
///
/// The result is truncated toward zero. A height that does not fit in `u32`
/// is an error.
pub fn scaled_height(target_width: u32, source_width: u32, source_height: u32) -> Result<u32> {
    if source_width == 0 {
        return Err(PipelineError::InvalidDimension(
            "source width must be positive".to_string(),
        ));
    }
    let aspect_ratio = source_height as f64 / source_width as f64;
    let height = (target_width as f64 * aspect_ratio).floor();
    if height > u32::MAX as f64 {
        return Err(PipelineError::InvalidDimension(format!(
            "scaled height {} does not fit in u32",
            height
        )));
    }
    Ok(height as u32)
}
