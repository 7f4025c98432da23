//! SORT multi-object tracking.
//!
//! Feed per-frame detections to a [`SortTracker`] and get back identity-stable
//! tracks. Each track runs a constant-velocity Kalman model over its box;
//! every frame the predicted boxes are matched to the new detections by an
//! optimal IoU assignment, after which tracks are confirmed, aged out, or
//! spawned.
//!
//! ```
//! use sort_tracker::{Detection, SortTracker, TrackerConfig};
//!
//! let mut tracker = SortTracker::new(TrackerConfig::default()).unwrap();
//! let out = tracker.step(&[Detection::new(10.0, 10.0, 50.0, 50.0, 0.9)]);
//! assert_eq!(out.tracks[0].track_id, 1);
//! ```
//!
//! The tracker is single-threaded and frame-sequential. Independent video
//! streams each need their own `SortTracker`; ids are per instance.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Error, InvalidDetectionReason, Result};
pub use integration::{DetectionBuilder, DetectionSource, IntoDetections, TrackerPipeline};
pub use tracker::{
    Detection, FrameOutput, NoiseConfig, Rect, SortTracker, TrackSnapshot, TrackState,
    TrackerConfig,
};
