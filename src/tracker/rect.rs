/// Axis-aligned bounding box with format conversion utilities.
///
/// Stored as corners (TLBR). Supports the formats used around the tracker:
/// - TLBR: x_min, y_min, x_max, y_max (detector input, tracker output)
/// - TLWH: Top-Left X, Top-Left Y, Width, Height (MOTChallenge files)
/// - XYSR: Center X, Center Y, Scale (area), Aspect Ratio (w/h), the motion model's observation
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    /// Create a new Rect from corner coordinates (TLBR format).
    #[inline]
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Create a Rect from TLWH format (top-left x, top-left y, width, height).
    #[inline]
    pub fn from_tlwh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Create a Rect from XYSR format (center x, center y, area, aspect ratio).
    ///
    /// Returns `None` when the area or aspect ratio is not strictly positive, or
    /// any component is non-finite: such a state has no box.
    pub fn from_xysr(cx: f64, cy: f64, scale: f64, ratio: f64) -> Option<Self> {
        if !(scale > 0.0 && ratio > 0.0) || !cx.is_finite() || !cy.is_finite() {
            return None;
        }
        let width = (scale * ratio).sqrt();
        let height = scale / width;
        if !width.is_finite() || !height.is_finite() {
            return None;
        }
        Some(Self::new(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        ))
    }

    /// Convert to TLBR format: (x_min, y_min, x_max, y_max).
    #[inline]
    pub fn to_tlbr(&self) -> [f64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f64; 4] {
        [self.x_min, self.y_min, self.width(), self.height()]
    }

    /// Convert to XYSR format: (center_x, center_y, area, aspect_ratio).
    #[inline]
    pub fn to_xysr(&self) -> [f64; 4] {
        let (cx, cy) = self.center();
        let height = self.height();
        let ratio = if height > 0.0 { self.width() / height } else { 0.0 };
        [cx, cy, self.area(), ratio]
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Get the area of the bounding box. Inverted boxes have zero area.
    #[inline]
    pub fn area(&self) -> f64 {
        (self.width().max(0.0)) * (self.height().max(0.0))
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    ///
    /// Always in `[0, 1]`; zero for disjoint or zero-area boxes.
    pub fn iou(&self, other: &Rect) -> f64 {
        let inter_width = (self.x_max.min(other.x_max) - self.x_min.max(other.x_min)).max(0.0);
        let inter_height = (self.y_max.min(other.y_max) - self.y_min.max(other.y_min)).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            (inter_area / union_area).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

use ndarray::Array2;

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[Rect], boxes_b: &[Rect]) -> Array2<f64> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}
