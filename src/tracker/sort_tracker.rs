//! SORT track manager: predict, associate, update and run the track lifecycle.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::error::{Error, InvalidDetectionReason, Result};
use crate::tracker::kalman_filter::NoiseConfig;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::Rect;
use crate::tracker::track::{Track, TrackSnapshot};
use crate::tracker::track_state::TrackState;

/// Configuration for the SortTracker.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU for an assigned (track, detection) pair to count as a match.
    pub iou_gate_threshold: f64,
    /// Consecutive matches needed before a track is reported.
    pub min_hits_to_confirm: u32,
    /// A track is deleted once `time_since_update` exceeds this.
    pub max_age_frames: u32,
    /// A missed track keeps its hit streak while `time_since_update` is at most this.
    pub streak_tolerance_frames: u32,
    /// Unmatched detections below this confidence do not start new tracks.
    pub min_score: f32,
    /// Number of recent boxes kept per track.
    pub history_len: usize,
    pub noise: NoiseConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_gate_threshold: 0.3,
            min_hits_to_confirm: 3,
            max_age_frames: 1,
            streak_tolerance_frames: 1,
            min_score: 0.0,
            history_len: 30,
            noise: NoiseConfig::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_gate_threshold) {
            return Err(Error::InvalidConfig {
                field: "iou_gate_threshold",
                reason: format!("must be within [0, 1], got {}", self.iou_gate_threshold),
            });
        }
        if self.min_hits_to_confirm == 0 {
            return Err(Error::InvalidConfig {
                field: "min_hits_to_confirm",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(Error::InvalidConfig {
                field: "min_score",
                reason: format!("must be within [0, 1], got {}", self.min_score),
            });
        }
        if self.history_len == 0 {
            return Err(Error::InvalidConfig {
                field: "history_len",
                reason: "must be at least 1".to_string(),
            });
        }
        self.noise.validate()
    }
}

/// A detection refused by [`SortTracker::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedDetection {
    /// Index into the slice passed to `step`
    pub index: usize,
    pub reason: InvalidDetectionReason,
}

impl From<RejectedDetection> for Error {
    fn from(r: RejectedDetection) -> Self {
        Error::InvalidDetection {
            index: r.index,
            reason: r.reason,
        }
    }
}

/// Result of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// 1-based frame number within this tracker
    pub frame_id: u64,
    /// Confirmed tracks, ascending by id
    pub tracks: Vec<TrackSnapshot>,
    /// Ids deleted during this frame
    pub deleted: Vec<u64>,
    pub rejected: Vec<RejectedDetection>,
}

#[derive(Debug)]
pub struct SortTracker {
    tracks: BTreeMap<u64, Track>,
    config: TrackerConfig,
    frame_count: u64,
    next_track_id: u64,
}

impl Default for SortTracker {
    fn default() -> Self {
        Self {
            tracks: BTreeMap::new(),
            config: TrackerConfig::default(),
            frame_count: 0,
            next_track_id: 1,
        }
    }
}

impl SortTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracks: BTreeMap::new(),
            config,
            frame_count: 0,
            next_track_id: 1,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames processed since creation or the last [`reset`](Self::reset).
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Snapshots of every live track, tentative ones included.
    pub fn live_tracks(&self) -> Vec<TrackSnapshot> {
        self.tracks.values().map(Track::snapshot).collect()
    }

    /// Recent boxes of a live track, oldest first.
    pub fn history(&self, track_id: u64) -> Option<Vec<Rect>> {
        self.tracks
            .get(&track_id)
            .map(|t| t.history().copied().collect())
    }

    /// Drop all tracks and restart the frame count. Ids keep counting up.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.frame_count = 0;
    }

    /// Process one frame of detections and return the confirmed tracks.
    pub fn step(&mut self, detections: &[Detection]) -> FrameOutput {
        self.frame_count += 1;

        let mut rejected = Vec::new();
        let mut valid = Vec::with_capacity(detections.len());
        for (index, det) in detections.iter().enumerate() {
            match det.validate() {
                Ok(()) => valid.push(*det),
                Err(reason) => {
                    warn!("frame {}: skipping detection {index}: {reason}", self.frame_count);
                    rejected.push(RejectedDetection { index, reason });
                }
            }
        }

        let mut deleted = Vec::new();

        // Step 1: Predict every live track
        let mut degenerate = Vec::new();
        for (&id, track) in self.tracks.iter_mut() {
            if let Err(e) = track.predict() {
                warn!("frame {}: {e}, deleting", self.frame_count);
                degenerate.push(id);
            }
        }
        self.remove_tracks(&degenerate, &mut deleted);

        // Step 2: Associate predictions with detections
        let track_ids: Vec<u64> = self.tracks.keys().copied().collect();
        let track_rects: Vec<Rect> = self.tracks.values().map(Track::rect).collect();
        let det_rects: Vec<Rect> = valid.iter().map(|d| d.bbox).collect();

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::associate(&track_rects, &det_rects, self.config.iou_gate_threshold);

        // Step 3: Correct matched tracks
        let mut degenerate = Vec::new();
        for &(itrack, idet) in &matches {
            let id = track_ids[itrack];
            if let Some(track) = self.tracks.get_mut(&id) {
                if let Err(e) = track.update(&valid[idet]) {
                    warn!("frame {}: {e}, deleting", self.frame_count);
                    degenerate.push(id);
                }
            }
        }
        self.remove_tracks(&degenerate, &mut deleted);

        // Step 4: Age out unmatched tracks
        let mut stale = Vec::new();
        for &itrack in &unmatched_tracks {
            let id = track_ids[itrack];
            if let Some(track) = self.tracks.get_mut(&id) {
                track.mark_missed(self.config.streak_tolerance_frames);
                if track.time_since_update > self.config.max_age_frames {
                    stale.push(id);
                }
            }
        }
        self.remove_tracks(&stale, &mut deleted);

        for track in self.tracks.values_mut() {
            track.record_history();
        }

        // Step 5: Init new tracks
        let spawned = self.spawn_tracks(&valid, &unmatched_detections);

        // Step 6: Promote
        let bootstrapping = self.frame_count <= u64::from(self.config.min_hits_to_confirm);
        for track in self.tracks.values_mut() {
            if track.state != TrackState::Tentative {
                continue;
            }
            let never_missed = track.hits == track.age() + 1;
            if track.hit_streak >= self.config.min_hits_to_confirm
                || (bootstrapping && never_missed)
            {
                track.mark_confirmed();
            }
        }

        let tracks: Vec<TrackSnapshot> = self
            .tracks
            .values()
            .filter(|t| t.is_confirmed())
            .map(Track::snapshot)
            .collect();

        debug!(
            "frame {}: {} detections ({} rejected), {} matched, {} spawned, {} deleted, {} live, {} confirmed",
            self.frame_count,
            detections.len(),
            rejected.len(),
            matches.len(),
            spawned,
            deleted.len(),
            self.tracks.len(),
            tracks.len()
        );

        FrameOutput {
            frame_id: self.frame_count,
            tracks,
            deleted,
            rejected,
        }
    }

    /// Start a tentative track for every unmatched detection that clears
    /// `min_score`. Detections are taken in geometric order so the ids handed
    /// out do not depend on the order of the input list.
    fn spawn_tracks(&mut self, detections: &[Detection], unmatched: &[usize]) -> usize {
        let mut candidates: Vec<&Detection> = unmatched
            .iter()
            .map(|&i| &detections[i])
            .filter(|d| d.score >= self.config.min_score)
            .collect();
        candidates.sort_by(|a, b| {
            a.bbox
                .x_min
                .total_cmp(&b.bbox.x_min)
                .then_with(|| a.bbox.y_min.total_cmp(&b.bbox.y_min))
                .then_with(|| a.bbox.x_max.total_cmp(&b.bbox.x_max))
                .then_with(|| a.bbox.y_max.total_cmp(&b.bbox.y_max))
                .then_with(|| a.score.total_cmp(&b.score))
        });

        for det in &candidates {
            let id = self.next_track_id;
            self.next_track_id += 1;
            self.tracks.insert(
                id,
                Track::new(id, det, &self.config.noise, self.config.history_len),
            );
        }
        candidates.len()
    }

    fn remove_tracks(&mut self, ids: &[u64], deleted: &mut Vec<u64>) {
        for id in ids {
            if let Some(mut track) = self.tracks.remove(id) {
                track.mark_deleted();
                debug!(
                    "frame {}: track {} deleted after {} frames",
                    self.frame_count, track.track_id, track.age()
                );
                deleted.push(*id);
            }
        }
    }
}
