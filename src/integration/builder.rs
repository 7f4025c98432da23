//! Builder for creating Detection objects from various input formats.

use crate::error::InvalidDetectionReason;
use crate::tracker::Detection;

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
    score: f32,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x_min, y_min, x_max, y_max).
    pub fn tlbr(mut self, x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        self.x_min = x_min;
        self.y_min = y_min;
        self.x_max = x_max;
        self.y_max = y_max;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        self.x_min = cx - w / 2.0;
        self.y_min = cy - h / 2.0;
        self.x_max = cx + w / 2.0;
        self.y_max = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.x_min = x;
        self.y_min = y;
        self.x_max = x + w;
        self.y_max = y + h;
        self
    }

    /// Scale coordinates given relative to the frame (`0..1`) into pixels.
    ///
    /// Call after setting the box.
    pub fn denormalize(mut self, frame_width: u32, frame_height: u32) -> Self {
        let (w, h) = (frame_width as f64, frame_height as f64);
        self.x_min *= w;
        self.x_max *= w;
        self.y_min *= h;
        self.y_max *= h;
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn build(self) -> Detection {
        Detection::new(self.x_min, self.y_min, self.x_max, self.y_max, self.score)
    }

    /// Build and check the detection the way the tracker will.
    pub fn try_build(self) -> Result<Detection, InvalidDetectionReason> {
        let det = self.build();
        det.validate()?;
        Ok(det)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .score(0.95)
            .build();

        assert_eq!(det.score, 0.95);
        assert_eq!(det.bbox.to_tlbr(), [10.0, 20.0, 50.0, 80.0]);
    }

    #[test]
    fn test_formats_agree() {
        let a = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build();
        let b = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build();
        assert_eq!(a.bbox, b.bbox);
    }

    #[test]
    fn test_denormalize() {
        let det = DetectionBuilder::new()
            .tlbr(0.25, 0.5, 0.75, 1.0)
            .denormalize(640, 480)
            .score(0.5)
            .build();
        assert_eq!(det.bbox.to_tlbr(), [160.0, 240.0, 480.0, 480.0]);
    }

    #[test]
    fn test_try_build_rejects_empty_box() {
        let res = DetectionBuilder::new().tlwh(10.0, 10.0, 0.0, 5.0).score(0.5).try_build();
        assert_eq!(res, Err(InvalidDetectionReason::NonPositiveWidth));
        assert!(DetectionBuilder::new().tlwh(10.0, 10.0, 4.0, 5.0).score(0.5).try_build().is_ok());
    }
}
