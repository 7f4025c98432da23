//! Where detections come from.
//!
//! The tracker never looks at pixels. A [`DetectionSource`] turns one frame
//! into boxes in image coordinates, and [`TrackerPipeline`](crate::TrackerPipeline)
//! feeds them to [`SortTracker::step`](crate::SortTracker::step).

use crate::tracker::Detection;

/// Produces the detections for one frame.
///
/// Boxes must be in the same pixel space on every frame, since association
/// compares them against predicted track boxes by IoU. Models that emit
/// frame-relative coordinates should scale them with
/// [`DetectionBuilder::denormalize`](crate::DetectionBuilder::denormalize)
/// first. Malformed boxes need not be filtered here: `SortTracker::step`
/// rejects them one by one and still tracks the rest of the frame.
///
/// # Example
///
/// ```
/// use sort_tracker::{Detection, DetectionSource};
///
/// /// Replays boxes computed offline, one list per frame.
/// struct Replay {
///     frames: std::vec::IntoIter<Vec<Detection>>,
/// }
///
/// impl DetectionSource for Replay {
///     type Error = std::convert::Infallible;
///
///     fn detect(&mut self, _input: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>, Self::Error> {
///         Ok(self.frames.next().unwrap_or_default())
///     }
/// }
///
/// let mut source = Replay {
///     frames: vec![vec![Detection::new(0.0, 0.0, 10.0, 10.0, 0.9)]].into_iter(),
/// };
/// assert_eq!(source.detect(&[], 640, 480).unwrap().len(), 1);
/// assert!(source.detect(&[], 640, 480).unwrap().is_empty());
/// ```
pub trait DetectionSource {
    type Error;

    /// Detect objects in one frame of `width` x `height` pixels. The layout
    /// of `input` is up to the implementation.
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Conversion from a model's raw output rows into tracker detections.
pub trait IntoDetections {
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// Rows of `[x_min, y_min, x_max, y_max, score]`, the layout most detectors
/// emit after NMS.
impl IntoDetections for Vec<[f32; 5]> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|[x1, y1, x2, y2, score]| {
                Detection::new(x1 as f64, y1 as f64, x2 as f64, y2 as f64, score)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_into_detections() {
        let dets = vec![[1.0, 2.0, 3.0, 4.0, 0.5]].into_detections();
        assert_eq!(dets, vec![Detection::new(1.0, 2.0, 3.0, 4.0, 0.5)]);
    }
}
