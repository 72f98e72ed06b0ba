//! Raster I/O Layer
//!
//! Decodes image files into pixel buffers and writes annotated buffers back
//! out. Decoding itself is delegated to the `image` crate; this layer only
//! validates the resulting layout.

pub mod buffer;

pub use buffer::{ChannelOrder, PixelBuffer};

use std::path::Path;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Load an image file into an RGB or RGBA pixel buffer
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path).map_err(|e| PipelineError::image_read(path, e))?;
    let buffer = PixelBuffer::from_dynamic(img);
    debug!(
        "Loaded {:?}: {}x{} with {} channels",
        path, buffer.width, buffer.height, buffer.channels
    );
    Ok(buffer)
}
