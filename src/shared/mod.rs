//! Shared state and messaging between pipeline workers and the display
//!
//! Workers hand results back through single-shot channels; the display
//! thread applies them to the shared [`DisplayState`].

pub mod messages;
pub mod state;

pub use messages::PipelineCompletion;
pub use state::DisplayState;
