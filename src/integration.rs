//! Boundary between the tracker core and the outside world.
//!
//! This module provides the trait detector backends implement, a builder for
//! detections in the box formats detectors commonly emit, a pipeline that
//! runs detection and tracking per frame, and MOTChallenge text I/O.

mod builder;
mod detector;
pub mod mot;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::TrackerPipeline;
