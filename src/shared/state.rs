//! Display state shared between the coordinator and the presentation layer

use tracing::debug;

use crate::error::Result;
use crate::raster::PixelBuffer;
use crate::render::{scaled_height, Texture};

/// Text shown when a request fails or finds nothing
pub const NO_TEXT_DETECTED: &str = "No text detected";

/// What the presentation layer currently shows
///
/// Holds at most one live texture. Installing a new texture hands the
/// previous one back so the caller can release its display resource.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// Texture currently on display
    pub texture: Option<Texture>,
    /// Annotated image the texture was encoded from, in its source layout
    pub annotated: Option<PixelBuffer>,
    /// Detected text in reading order
    pub text: String,
    /// Last error message (if any)
    pub last_error: Option<String>,
    /// Generation of the most recently applied request
    pub applied_generation: u64,
    /// Whether a request is in flight
    pub is_processing: bool,
}

impl DisplayState {
    /// Create an empty display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a finished result, returning the texture it replaces
    ///
    /// Results older than the last applied generation are ignored and `None`
    /// is returned.
    pub fn install(
        &mut self,
        generation: u64,
        texture: Texture,
        annotated: PixelBuffer,
        text: String,
    ) -> Option<Texture> {
        if generation < self.applied_generation {
            debug!(
                "Ignoring result {} older than applied {}",
                generation, self.applied_generation
            );
            return None;
        }

        self.applied_generation = generation;
        self.text = text;
        self.annotated = Some(annotated);
        self.clear_error();
        self.texture.replace(texture)
    }

    /// Record a failed request, releasing the texture of the previous image
    pub fn fail(&mut self, generation: u64, error: impl Into<String>) -> Option<Texture> {
        if generation < self.applied_generation {
            return None;
        }

        self.applied_generation = generation;
        self.text = NO_TEXT_DETECTED.to_string();
        self.set_error(error);
        self.annotated = None;
        self.texture.take()
    }

    /// Size to show the current texture at for a given width
    pub fn display_size(&self, target_width: u32) -> Result<Option<(u32, u32)>> {
        self.texture
            .as_ref()
            .map(|t| scaled_height(target_width, t.width, t.height).map(|h| (target_width, h)))
            .transpose()
    }

    /// Clear any error state
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Set an error message
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }
}
