//! Pixel buffer handed between the raster layer and the renderers

use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Byte order of the color channels within a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    /// Red, green, blue (image files decoded by the `image` crate)
    #[default]
    Rgb,
    /// Blue, green, red (camera and screen capture buffers)
    Bgr,
}

/// A decoded image in row-major, channel-interleaved layout
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bytes per pixel (3 or 4 for color images)
    pub channels: u8,
    /// Color channel order
    pub order: ChannelOrder,
    /// Raw pixel bytes
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer, checking that the data length matches the stated layout
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self> {
        let buffer = Self {
            width,
            height,
            channels,
            order: ChannelOrder::Rgb,
            data,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Create a buffer whose every pixel has the same value
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> Result<Self> {
        let channels = u8::try_from(pixel.len())
            .map_err(|_| PipelineError::UnsupportedChannels(u8::MAX))?;
        let data = pixel.repeat(width as usize * height as usize);
        Self::new(data, width, height, channels)
    }

    /// Set the channel order of the buffer
    pub fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    /// Convert a decoded image, keeping alpha only when the source has it
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height, channels, data) = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            (rgba.width(), rgba.height(), 4, rgba.into_raw())
        } else {
            let rgb = img.to_rgb8();
            (rgb.width(), rgb.height(), 3, rgb.into_raw())
        };

        Self {
            width,
            height,
            channels,
            order: ChannelOrder::Rgb,
            data,
        }
    }

    /// Get buffer dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels in the buffer
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that `data` holds exactly `width * height * channels` bytes
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(PipelineError::UnsupportedChannels(0));
        }
        let expected = self.pixel_count() * self.channels as usize;
        if self.data.len() != expected {
            return Err(PipelineError::InvalidDimension(format!(
                "buffer holds {} bytes but {}x{}x{} needs {}",
                self.data.len(),
                self.width,
                self.height,
                self.channels,
                expected
            )));
        }
        Ok(())
    }

    /// Validate the layout and require a 3- or 4-channel color buffer
    pub fn ensure_color(&self) -> Result<()> {
        self.validate()?;
        match self.channels {
            3 | 4 => Ok(()),
            other => Err(PipelineError::UnsupportedChannels(other)),
        }
    }

    /// Pixel data with channels in RGB(A) order
    pub fn rgb_ordered_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.order == ChannelOrder::Bgr && self.channels >= 3 {
            for chunk in data.chunks_exact_mut(self.channels as usize) {
                chunk.swap(0, 2); // Swap B and R
            }
        }
        data
    }

    /// Write the buffer to an image file, dropping alpha for JPEG output
    pub fn save(&self, path: &Path) -> Result<()> {
        self.ensure_color()?;
        let (width, height) = self.dimensions();
        let data = self.rgb_ordered_data();

        let img = match self.channels {
            4 => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
            _ => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        };
        let img = img
            .ok_or_else(|| PipelineError::InvalidDimension("buffer does not fit image".to_string()))?;

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        let result = if ext == "jpg" || ext == "jpeg" {
            DynamicImage::ImageRgb8(img.to_rgb8()).save(path)
        } else {
            img.save(path)
        };
        result.map_err(|e| PipelineError::ImageWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
