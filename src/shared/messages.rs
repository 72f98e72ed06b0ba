//! Message types passed from pipeline workers back to the display thread

use crate::app::TextureResult;
use crate::error::Result;

/// Outcome of one pipeline request, sent once over its result channel
#[derive(Debug)]
pub struct PipelineCompletion {
    /// Generation the request was issued with
    pub generation: u64,
    /// Pipeline output; `Ok(None)` when the worker abandoned superseded work
    pub result: Result<Option<TextureResult>>,
}
