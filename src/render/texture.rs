//! Texture encoding for display upload

use tracing::debug;

use crate::error::Result;
use crate::raster::{ChannelOrder, PixelBuffer};

/// Channels per texel in an encoded texture
pub const TEXTURE_CHANNELS: usize = 4;

/// Normalized RGBA pixels ready for upload to a display texture
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,
    /// Texture height in pixels
    pub height: u32,
    /// Interleaved R, G, B, A values in `[0, 1]`, row-major
    pub data: Vec<f32>,
}

impl Texture {
    /// RGBA value of a single pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * TEXTURE_CHANNELS;
        let texel = &self.data[idx..idx + TEXTURE_CHANNELS];
        Some([texel[0], texel[1], texel[2], texel[3]])
    }

    /// Texture dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Encode a 3- or 4-channel buffer as a normalized RGBA float texture
///
/// Three-channel buffers get a fully opaque alpha. BGR buffers are reordered
/// to RGB. The output always holds `width * height * 4` values.
pub fn encode(image: &PixelBuffer) -> Result<Texture> {
    image.ensure_color()?;

    let channels = image.channels as usize;
    let mut data = Vec::with_capacity(image.pixel_count() * TEXTURE_CHANNELS);

    for px in image.data.chunks_exact(channels) {
        let (r, g, b) = match image.order {
            ChannelOrder::Rgb => (px[0], px[1], px[2]),
            ChannelOrder::Bgr => (px[2], px[1], px[0]),
        };
        let a = if channels == 4 { px[3] } else { u8::MAX };

        data.extend([r, g, b, a].map(normalize));
    }

    debug!(
        "Encoded {}x{} texture ({} values)",
        image.width,
        image.height,
        data.len()
    );

    Ok(Texture {
        width: image.width,
        height: image.height,
        data,
    })
}

/// Map a byte (0..=255) to `[0, 1]`
fn normalize(v: u8) -> f32 {
    v as f32 / 255.0
}
