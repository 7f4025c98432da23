//! Detections, the IoU cost matrix and the frame's assignment problem.

use log::{error, trace};
use ndarray::Array2;

use crate::error::InvalidDetectionReason;
use crate::tracker::rect::{Rect, iou_batch};

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    /// Bounding box (x_min, y_min, x_max, y_max)
    pub bbox: Rect,
    /// Detection confidence score in `[0, 1]`
    pub score: f32,
}

impl Detection {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64, score: f32) -> Self {
        Self {
            bbox: Rect::new(x_min, y_min, x_max, y_max),
            score,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self { bbox, score }
    }

    /// Check that the detection can be fed to the cost function.
    ///
    /// Frame bounds are not checked; the tracker has no notion of frame size.
    pub fn validate(&self) -> Result<(), InvalidDetectionReason> {
        let Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        } = self.bbox;
        if [x_min, y_min, x_max, y_max].iter().any(|v| !v.is_finite()) || !self.score.is_finite() {
            return Err(InvalidDetectionReason::NonFinite);
        }
        if x_max <= x_min {
            return Err(InvalidDetectionReason::NonPositiveWidth);
        }
        if y_max <= y_min {
            return Err(InvalidDetectionReason::NonPositiveHeight);
        }
        if !(0.0..=1.0).contains(&self.score) {
            return Err(InvalidDetectionReason::ScoreOutOfRange);
        }
        Ok(())
    }
}

/// Compute IoU distance matrix between tracks and detections.
///
/// Entry (i, j) is `1 - iou(track_i, det_j)`; lower is better.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f64> {
    iou_batch(track_boxes, det_boxes).mapv(|iou| 1.0 - iou)
}

/// Outcome of one frame's association.
///
/// Every row index appears exactly once in `matches` or `unmatched_tracks`,
/// every column index exactly once in `matches` or `unmatched_detections`.
/// All three lists are in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// (track index, detection index) pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Solve the rectangular minimum-cost assignment over `cost_matrix`
/// (rows = tracks, columns = detections), then drop pairs whose cost
/// exceeds `max_cost`.
///
/// The matrix is padded to square so surplus rows or columns stay unmatched.
pub fn linear_assignment(cost_matrix: &Array2<f64>, max_cost: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: vec![],
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    if num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: vec![],
        };
    }

    // Padding rows/columns only ever meet real entries on one side, so the
    // value does not change which real pairs are optimal.
    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1.0);
    padded
        .slice_mut(ndarray::s![..num_rows, ..num_cols])
        .assign(cost_matrix);

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
                if col_idx >= num_cols {
                    unmatched_tracks.push(row_idx);
                } else if cost_matrix[[row_idx, col_idx]] <= max_cost {
                    matches.push((row_idx, col_idx));
                    unmatched_detections_mask[col_idx] = false;
                } else {
                    trace!(
                        "gated pair (track {row_idx}, det {col_idx}) cost {:.3} > {max_cost:.3}",
                        cost_matrix[[row_idx, col_idx]]
                    );
                    unmatched_tracks.push(row_idx);
                }
            }
        }
        Err(e) => {
            error!("assignment solver failed on {num_rows}x{num_cols} matrix: {e:?}");
            unmatched_tracks = (0..num_rows).collect();
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Match predicted track boxes against detection boxes, accepting a pair
/// only if its IoU reaches `iou_gate_threshold`.
pub fn associate(
    track_boxes: &[Rect],
    det_boxes: &[Rect],
    iou_gate_threshold: f64,
) -> AssignmentResult {
    let dists = iou_distance(track_boxes, det_boxes);
    linear_assignment(&dists, 1.0 - iou_gate_threshold)
}
