//! Constant-velocity Kalman motion model for a single bounding box.
//!
//! State layout (7-dim): `[cx, cy, s, r, vx, vy, vs]` where `s` is the box area
//! and `r` the aspect ratio (w/h). The aspect ratio has no velocity term.
//! Observations are `[cx, cy, s, r]`.
//!
//! Matrix algebra uses ndarray; the 4x4 innovation inverse and the
//! positive-definiteness check go through nalgebra.

use ndarray::{Array1, Array2};

use crate::error::{Error, Result};
use crate::tracker::rect::Rect;

const STATE_DIM: usize = 7;
const MEAS_DIM: usize = 4;

/// Noise magnitudes of the motion model.
///
/// Defaults are the classical SORT box-filter values. They are tuning
/// parameters, not derived quantities.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Initial variance of cx, cy, s and r.
    pub initial_position_variance: f64,
    /// Initial variance of vx, vy and vs. Large: motion is unknown at birth.
    pub initial_velocity_variance: f64,
    /// Measurement variance of cx and cy.
    pub measurement_position_variance: f64,
    /// Measurement variance of s and r.
    pub measurement_shape_variance: f64,
    /// Process variance of cx, cy, s and r per frame.
    pub process_position_variance: f64,
    /// Process variance of vx and vy per frame.
    pub process_velocity_variance: f64,
    /// Process variance of vs per frame.
    pub process_scale_velocity_variance: f64,
    /// Number of corrections during which velocity process noise is inflated.
    pub warmup_updates: u32,
    /// Multiplier applied to velocity process noise during warmup.
    pub warmup_velocity_factor: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            initial_position_variance: 10.0,
            initial_velocity_variance: 10_000.0,
            measurement_position_variance: 1.0,
            measurement_shape_variance: 10.0,
            process_position_variance: 1.0,
            process_velocity_variance: 0.01,
            process_scale_velocity_variance: 0.0001,
            warmup_updates: 3,
            warmup_velocity_factor: 10.0,
        }
    }
}

impl NoiseConfig {
    pub fn validate(&self) -> Result<()> {
        let variances = [
            ("noise.initial_position_variance", self.initial_position_variance),
            ("noise.initial_velocity_variance", self.initial_velocity_variance),
            (
                "noise.measurement_position_variance",
                self.measurement_position_variance,
            ),
            ("noise.measurement_shape_variance", self.measurement_shape_variance),
            ("noise.process_position_variance", self.process_position_variance),
            ("noise.process_velocity_variance", self.process_velocity_variance),
            (
                "noise.process_scale_velocity_variance",
                self.process_scale_velocity_variance,
            ),
        ];
        for (field, value) in variances {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("must be finite and > 0, got {value}"),
                });
            }
        }
        if !(self.warmup_velocity_factor.is_finite() && self.warmup_velocity_factor >= 1.0) {
            return Err(Error::InvalidConfig {
                field: "noise.warmup_velocity_factor",
                reason: format!("must be finite and >= 1, got {}", self.warmup_velocity_factor),
            });
        }
        Ok(())
    }
}

/// The model state stopped describing a valid box (non-finite values,
/// non-positive area, or a covariance that is no longer positive-definite).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("motion model state is degenerate")]
pub struct DegenerateState;

/// Kalman filter tracking one bounding box.
#[derive(Debug, Clone)]
pub struct MotionModel {
    mean: Array1<f64>,
    covariance: Array2<f64>,
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    measurement_cov: Array2<f64>,
    noise: NoiseConfig,
    /// Number of predict steps taken.
    age: u32,
    /// Number of corrections absorbed.
    updates: u32,
    awaiting_correction: bool,
}

impl MotionModel {
    /// Seed a model from a detection box with zero velocity.
    pub fn new(bbox: &Rect, noise: &NoiseConfig) -> Self {
        let mut motion_mat = Array2::eye(STATE_DIM);
        for i in 0..3 {
            motion_mat[[i, MEAS_DIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((MEAS_DIM, STATE_DIM));
        for i in 0..MEAS_DIM {
            update_mat[[i, i]] = 1.0;
        }

        let measurement_cov = diagonal(&[
            noise.measurement_position_variance,
            noise.measurement_position_variance,
            noise.measurement_shape_variance,
            noise.measurement_shape_variance,
        ]);

        let mut mean = Array1::zeros(STATE_DIM);
        for (i, v) in bbox.to_xysr().into_iter().enumerate() {
            mean[i] = v;
        }

        let p = noise.initial_position_variance;
        let v = noise.initial_velocity_variance;
        let covariance = diagonal(&[p, p, p, p, v, v, v]);

        Self {
            mean,
            covariance,
            motion_mat,
            update_mat,
            measurement_cov,
            noise: noise.clone(),
            age: 0,
            updates: 0,
            awaiting_correction: false,
        }
    }

    /// Advance the state one frame and return the predicted box.
    pub fn predict(&mut self) -> std::result::Result<Rect, DegenerateState> {
        // A shrinking box must not be driven through zero area.
        if self.mean[6] + self.mean[2] <= 0.0 {
            self.mean[6] = 0.0;
        }

        let process_cov = self.process_cov();
        self.mean = self.motion_mat.dot(&self.mean);
        self.covariance =
            self.motion_mat.dot(&self.covariance).dot(&self.motion_mat.t()) + process_cov;

        self.age += 1;
        self.awaiting_correction = true;
        self.check()
    }

    /// Fuse an observed box into the predicted state.
    ///
    /// Call at most once after each [`predict`](Self::predict).
    pub fn correct(&mut self, bbox: &Rect) -> std::result::Result<Rect, DegenerateState> {
        debug_assert!(self.awaiting_correction, "correct() called twice for one predict()");
        self.awaiting_correction = false;

        let measurement = Array1::from_vec(bbox.to_xysr().to_vec());
        let innovation = measurement - self.update_mat.dot(&self.mean);

        let projected_cov = self
            .update_mat
            .dot(&self.covariance)
            .dot(&self.update_mat.t())
            + &self.measurement_cov;
        let s_inv = invert_4x4(&projected_cov).ok_or(DegenerateState)?;

        // K = P * H^T * S^-1
        let kalman_gain = self.covariance.dot(&self.update_mat.t()).dot(&s_inv);

        self.mean = &self.mean + &kalman_gain.dot(&innovation);
        let covariance = &self.covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());
        // keep P symmetric against round-off
        self.covariance = (&covariance + &covariance.t()) * 0.5;

        self.updates += 1;
        self.check()
    }

    /// Current state as a box. `None` when the state has no valid box.
    pub fn current_box(&self) -> Option<Rect> {
        Rect::from_xysr(self.mean[0], self.mean[1], self.mean[2], self.mean[3])
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Velocity of the box center in pixels per frame.
    pub fn velocity(&self) -> (f64, f64) {
        (self.mean[4], self.mean[5])
    }

    fn process_cov(&self) -> Array2<f64> {
        let factor = if self.updates < self.noise.warmup_updates {
            self.noise.warmup_velocity_factor
        } else {
            1.0
        };
        let p = self.noise.process_position_variance;
        let v = self.noise.process_velocity_variance * factor;
        let vs = self.noise.process_scale_velocity_variance * factor;
        diagonal(&[p, p, p, p, v, v, vs])
    }

    fn check(&self) -> std::result::Result<Rect, DegenerateState> {
        if self.mean.iter().any(|v| !v.is_finite())
            || self.covariance.iter().any(|v| !v.is_finite())
            || !is_positive_definite(&self.covariance)
        {
            return Err(DegenerateState);
        }
        self.current_box().ok_or(DegenerateState)
    }
}

fn diagonal(values: &[f64]) -> Array2<f64> {
    Array2::from_diag(&Array1::from_vec(values.to_vec()))
}

fn is_positive_definite(m: &Array2<f64>) -> bool {
    let nm = nalgebra::SMatrix::<f64, STATE_DIM, STATE_DIM>::from_fn(|i, j| m[[i, j]]);
    nm.cholesky().is_some()
}

/// Invert a 4x4 matrix using nalgebra (pure Rust, no BLAS/LAPACK).
fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix4::from_fn(|i, j| m[[i, j]]);
    let inv = nm.try_inverse()?;
    Some(Array2::from_shape_fn((MEAS_DIM, MEAS_DIM), |(i, j)| inv[(i, j)]))
}
