//! Rendering Layer
//!
//! Draws detection outlines onto pixel buffers, encodes the result as a
//! normalized RGBA texture and sizes it for display.

pub mod annotate;
pub mod scale;
pub mod texture;

pub use annotate::{annotate, annotate_with, HighlightOptions};
pub use scale::scaled_height;
pub use texture::{encode, Texture};
