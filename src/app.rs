//! Application Coordinator
//!
//! Runs the detection pipeline off the display thread and applies results to
//! the shared display state. Every request gets a generation number; only the
//! newest generation may update what is shown, and superseded work is dropped
//! without surfacing an error.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::raster::{load_image, PixelBuffer};
use crate::render::{annotate_with, encode, Texture};
use crate::shared::{DisplayState, PipelineCompletion};
use crate::vision::lines::reconstruct;
use crate::vision::{Detection, TextDetector};

/// Texture and text produced by one pipeline run
#[derive(Debug, Clone)]
pub struct TextureResult {
    /// Annotated image encoded for display
    pub texture: Texture,
    /// Detected text in reading order
    pub detected_text: String,
    /// Annotated pixel buffer the texture was encoded from
    pub annotated: PixelBuffer,
    /// Raw detections from the engine
    pub detections: Vec<Detection>,
}

/// Detection pipeline: load, detect, annotate, encode, reconstruct
pub struct Pipeline {
    detector: Arc<dyn TextDetector>,
    config: AppConfig,
}

impl Pipeline {
    /// Create a pipeline over a detector with the given settings
    pub fn new(detector: Arc<dyn TextDetector>, config: AppConfig) -> Self {
        Self { detector, config }
    }

    /// Run the full pipeline on an image file
    pub fn process(&self, path: &Path) -> Result<TextureResult> {
        let image = load_image(path)?;
        self.process_image(image)
    }

    /// Run detection and rendering on an already decoded image
    pub fn process_image(&self, image: PixelBuffer) -> Result<TextureResult> {
        let detections = self.detector.detect(&image)?;
        self.render(image, detections)
    }

    /// Run the pipeline, checking `is_stale` between stages
    ///
    /// Returns `Ok(None)` as soon as `is_stale` reports the request has been
    /// superseded.
    pub fn process_cancellable(
        &self,
        path: &Path,
        is_stale: &dyn Fn() -> bool,
    ) -> Result<Option<TextureResult>> {
        let image = load_image(path)?;
        if is_stale() {
            return Ok(None);
        }

        let start = Instant::now();
        let detections = self.detector.detect(&image)?;
        debug!("Detection found {} regions in {:?}", detections.len(), start.elapsed());
        if is_stale() {
            return Ok(None);
        }

        self.render(image, detections).map(Some)
    }

    /// Annotate, encode and reconstruct text for a set of detections
    ///
    /// An annotation failure falls back to the unannotated image.
    pub fn render(&self, image: PixelBuffer, detections: Vec<Detection>) -> Result<TextureResult> {
        let options = self.config.highlight_options();

        let annotated = match annotate_with(image.clone(), &detections, &options) {
            Ok(annotated) => annotated,
            Err(e) => {
                warn!("Annotation failed, showing the original image: {}", e);
                image
            }
        };

        let texture = encode(&annotated)?;
        let detected_text = reconstruct(&detections, self.config.text.line_threshold_factor);

        Ok(TextureResult {
            texture,
            detected_text,
            annotated,
            detections,
        })
    }
}

/// In-flight request whose result has not been applied yet
struct PendingRequest {
    generation: u64,
    rx: Receiver<PipelineCompletion>,
}

/// Issues pipeline requests on worker threads and applies their results
pub struct ProcessingCoordinator {
    pipeline: Arc<Pipeline>,
    state: Arc<RwLock<DisplayState>>,
    latest_generation: Arc<AtomicU64>,
    pending: Option<PendingRequest>,
}

impl ProcessingCoordinator {
    /// Create a coordinator with a fresh display state
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            state: Arc::new(RwLock::new(DisplayState::new())),
            latest_generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Get the shared display state
    pub fn state(&self) -> Arc<RwLock<DisplayState>> {
        self.state.clone()
    }

    /// Generation of the most recently issued request
    pub fn latest_generation(&self) -> u64 {
        self.latest_generation.load(Ordering::SeqCst)
    }

    /// Whether a request is still waiting to be applied
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Start processing an image on a worker thread
    ///
    /// Any request still in flight is superseded: its result will be dropped
    /// when it arrives.
    pub fn submit(&mut self, path: impl Into<PathBuf>) -> u64 {
        let path = path.into();
        let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = bounded(1);

        let pipeline = self.pipeline.clone();
        let latest = self.latest_generation.clone();
        std::thread::spawn(move || {
            debug!("Worker {} processing {:?}", generation, path);
            let is_stale = || latest.load(Ordering::SeqCst) != generation;
            let result = pipeline.process_cancellable(&path, &is_stale);
            // The receiver is gone once the request is superseded
            let _ = tx.send(PipelineCompletion { generation, result });
        });

        if let Some(previous) = self.pending.replace(PendingRequest { generation, rx }) {
            info!("Request {} superseded by {}", previous.generation, generation);
        }
        self.state.write().is_processing = true;

        generation
    }

    /// Apply the pending result if it has arrived, without blocking
    ///
    /// Returns the generation that was applied, if any.
    pub fn poll(&mut self) -> Option<u64> {
        let pending = self.pending.as_ref()?;
        match pending.rx.try_recv() {
            Ok(completion) => {
                self.pending = None;
                self.apply(completion)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.worker_lost(),
        }
    }

    /// Block until the pending result arrives or `timeout` elapses
    pub fn wait(&mut self, timeout: Duration) -> Option<u64> {
        let pending = self.pending.as_ref()?;
        match pending.rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.pending = None;
                self.apply(completion)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
        }
    }

    fn apply(&mut self, completion: PipelineCompletion) -> Option<u64> {
        let PipelineCompletion { generation, result } = completion;

        if generation != self.latest_generation() {
            debug!("Dropping stale result for request {}", generation);
            return None;
        }

        let mut state = self.state.write();
        state.is_processing = false;

        match result {
            Ok(Some(output)) => {
                info!(
                    "Request {} done: {} detections, {}x{} texture",
                    generation,
                    output.detections.len(),
                    output.texture.width,
                    output.texture.height
                );
                let TextureResult {
                    texture,
                    detected_text,
                    annotated,
                    ..
                } = output;
                if state
                    .install(generation, texture, annotated, detected_text)
                    .is_some()
                {
                    debug!("Released previous texture");
                }
                Some(generation)
            }
            Ok(None) => {
                debug!("Request {} was abandoned", generation);
                None
            }
            Err(e) => {
                error!("Request {} failed: {}", generation, e);
                state.fail(generation, e.to_string());
                Some(generation)
            }
        }
    }

    fn worker_lost(&mut self) -> Option<u64> {
        let generation = self.pending.take()?.generation;
        error!("Worker for request {} exited without a result", generation);

        let mut state = self.state.write();
        state.is_processing = false;
        state.fail(generation, "Processing stopped unexpectedly");
        Some(generation)
    }
}
