//! TrackerPipeline for combining detection with tracking.

use crate::error::Result;
use crate::tracker::{FrameOutput, SortTracker, TrackerConfig};

use super::DetectionSource;

/// A combined tracker that bundles detection inference with SORT.
///
/// One pipeline per video stream: the tracker inside keeps per-stream state.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: SortTracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Result<Self> {
        Ok(Self {
            detector,
            tracker: SortTracker::new(config)?,
        })
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self {
            detector,
            tracker: SortTracker::default(),
        }
    }

    /// Process a single frame and return the confirmed tracks.
    ///
    /// Runs detection on the input image, then steps the tracker with the
    /// detected objects. A detector failure leaves the tracker untouched.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> std::result::Result<FrameOutput, D::Error> {
        let detections = self.detector.detect(input, width, height)?;
        Ok(self.tracker.step(&detections))
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &SortTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SortTracker {
        &mut self.tracker
    }
}
