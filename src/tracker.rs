mod kalman_filter;
mod matching;
mod rect;
mod sort_tracker;
mod track;
mod track_state;

pub use kalman_filter::{DegenerateState, MotionModel, NoiseConfig};
pub use matching::{AssignmentResult, Detection, associate, iou_distance, linear_assignment};
pub use rect::{Rect, iou_batch};
pub use sort_tracker::{FrameOutput, RejectedDetection, SortTracker, TrackerConfig};
pub use track::{Track, TrackSnapshot};
pub use track_state::TrackState;
