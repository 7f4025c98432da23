//! Single object track for multi-object tracking.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::tracker::kalman_filter::{MotionModel, NoiseConfig};
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Value snapshot of a track, handed out to callers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackSnapshot {
    /// Unique track identifier, never reused by the tracker that issued it
    pub track_id: u64,
    pub bbox: Rect,
    pub state: TrackState,
    /// Confidence of the most recently matched detection
    pub score: f32,
    pub age: u32,
    pub hits: u32,
    pub hit_streak: u32,
    pub time_since_update: u32,
}

/// Single object track.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    /// Current lifecycle state
    pub state: TrackState,
    /// Detection confidence score
    pub score: f32,
    /// Total number of matched frames, including the birth detection
    pub hits: u32,
    /// Consecutive matched frames
    pub hit_streak: u32,
    /// Frames since the last successful match
    pub time_since_update: u32,
    motion: MotionModel,
    bbox: Rect,
    history: VecDeque<Rect>,
    history_len: usize,
}

impl Track {
    /// Create a new tentative track seeded from a detection with zero velocity.
    pub fn new(track_id: u64, detection: &Detection, noise: &NoiseConfig, history_len: usize) -> Self {
        let mut history = VecDeque::with_capacity(history_len);
        history.push_back(detection.bbox);
        Self {
            track_id,
            state: TrackState::Tentative,
            score: detection.score,
            hits: 1,
            hit_streak: 1,
            time_since_update: 0,
            motion: MotionModel::new(&detection.bbox, noise),
            bbox: detection.bbox,
            history,
            history_len,
        }
    }

    /// Current box estimate (predicted, or corrected if matched this frame).
    pub fn rect(&self) -> Rect {
        self.bbox
    }

    /// Frames since creation, counted by the motion model's predict steps.
    pub fn age(&self) -> u32 {
        self.motion.age()
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    /// Recent box estimates, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Rect> {
        self.history.iter()
    }

    /// Advance one frame: age the track and predict its box.
    pub fn predict(&mut self) -> Result<Rect> {
        self.time_since_update += 1;
        self.bbox = self
            .motion
            .predict()
            .map_err(|_| Error::NumericalDegeneracy {
                track_id: self.track_id,
            })?;
        Ok(self.bbox)
    }

    /// Apply a matched detection.
    pub fn update(&mut self, detection: &Detection) -> Result<()> {
        self.bbox = self
            .motion
            .correct(&detection.bbox)
            .map_err(|_| Error::NumericalDegeneracy {
                track_id: self.track_id,
            })?;
        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        self.score = detection.score;
        Ok(())
    }

    /// Account for a frame without a matching detection.
    ///
    /// The streak is kept through up to `streak_tolerance` missed frames
    /// (it is not incremented either).
    pub fn mark_missed(&mut self, streak_tolerance: u32) {
        if self.time_since_update > streak_tolerance {
            self.hit_streak = 0;
        }
    }

    pub fn mark_confirmed(&mut self) {
        self.state = TrackState::Confirmed;
    }

    pub fn mark_deleted(&mut self) {
        self.state = TrackState::Deleted;
    }

    /// Record the frame's final box estimate.
    pub fn record_history(&mut self) {
        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(self.bbox);
    }

    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            track_id: self.track_id,
            bbox: self.bbox,
            state: self.state,
            score: self.score,
            age: self.age(),
            hits: self.hits,
            hit_streak: self.hit_streak,
            time_since_update: self.time_since_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track::new(
            7,
            &Detection::new(10.0, 10.0, 50.0, 50.0, 0.9),
            &NoiseConfig::default(),
            3,
        )
    }

    #[test]
    fn test_new_track_is_tentative() {
        let t = track();
        assert_eq!(t.state, TrackState::Tentative);
        assert_eq!(t.hit_streak, 1);
        assert_eq!(t.time_since_update, 0);
        assert_eq!(t.rect(), Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_predict_and_update_counters() {
        let mut t = track();
        t.predict().unwrap();
        assert_eq!((t.age(), t.time_since_update), (1, 1));

        t.update(&Detection::new(11.0, 10.0, 51.0, 50.0, 0.7)).unwrap();
        assert_eq!((t.time_since_update, t.hit_streak, t.hits), (0, 2, 2));
        assert_eq!(t.score, 0.7);
    }

    #[test]
    fn test_streak_survives_single_miss() {
        let mut t = track();
        t.predict().unwrap();
        t.mark_missed(1);
        assert_eq!(t.hit_streak, 1);

        t.predict().unwrap();
        t.mark_missed(1);
        assert_eq!(t.hit_streak, 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut t = track();
        for _ in 0..5 {
            t.predict().unwrap();
            t.record_history();
        }
        assert_eq!(t.history().count(), 3);
    }
}
