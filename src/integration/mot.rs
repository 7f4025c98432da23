//! MOTChallenge text format.
//!
//! Detection files hold one box per line:
//! `frame,id,bb_left,bb_top,bb_width,bb_height,conf[,x,y,z]` with 1-based
//! frame numbers. Tracker results use the same layout with the track id in
//! the second column and `1,-1,-1,-1` in the trailing columns.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::tracker::{Detection, Rect, TrackSnapshot};

/// Largest jump allowed between a frame number and the highest one seen
/// before it. Empty frames up to the jump are materialised.
pub const MAX_FRAME_GAP: usize = 100_000;

/// Read a detection file into per-frame detection lists.
///
/// Index `i` of the result holds frame `i + 1`. Frames without any line are
/// present as empty lists so the tracker still ages its tracks on them.
/// Confidences are clamped into `[0, 1]` since MOT detector scores are not
/// normalised. Blank lines and `#` comments are skipped. A frame number more
/// than [`MAX_FRAME_GAP`] past the highest one so far is a parse error.
pub fn read_detections<R: BufRead>(reader: R) -> Result<Vec<Vec<Detection>>> {
    let mut by_frame: BTreeMap<usize, Vec<Detection>> = BTreeMap::new();
    let mut last_frame = 0usize;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (frame, det) = parse_line(line).map_err(|reason| Error::Parse {
            line: lineno + 1,
            reason,
        })?;
        if frame > last_frame + MAX_FRAME_GAP {
            return Err(Error::Parse {
                line: lineno + 1,
                reason: format!(
                    "frame {frame} is more than {MAX_FRAME_GAP} frames after frame {last_frame}"
                ),
            });
        }
        last_frame = last_frame.max(frame);
        by_frame.entry(frame).or_default().push(det);
    }

    let mut frames: Vec<Vec<Detection>> = Vec::with_capacity(last_frame);
    frames.resize_with(last_frame, Vec::new);
    for (frame, dets) in by_frame {
        frames[frame - 1] = dets;
    }
    Ok(frames)
}

fn parse_line(line: &str) -> std::result::Result<(usize, Detection), String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 7 {
        return Err(format!("expected at least 7 fields, got {}", fields.len()));
    }

    // Some exporters write the frame as a float ("1.0").
    let frame: f64 = fields[0]
        .parse()
        .map_err(|_| format!("bad frame number `{}`", fields[0]))?;
    if frame.fract() != 0.0 || frame < 1.0 || frame > f64::from(u32::MAX) {
        return Err(format!("bad frame number `{}`", fields[0]));
    }

    let mut values = [0.0f64; 5];
    for (slot, field) in values.iter_mut().zip(&fields[2..7]) {
        *slot = field
            .parse()
            .map_err(|_| format!("bad number `{field}`"))?;
    }
    let [x, y, w, h, conf] = values;

    Ok((
        frame as usize,
        Detection::from_rect(Rect::from_tlwh(x, y, w, h), conf.clamp(0.0, 1.0) as f32),
    ))
}

/// Format one confirmed track as a MOTChallenge result line.
pub fn format_track(frame: u64, track: &TrackSnapshot) -> String {
    let [x, y, w, h] = track.bbox.to_tlwh();
    format!(
        "{frame},{},{x:.2},{y:.2},{w:.2},{h:.2},1,-1,-1,-1",
        track.track_id
    )
}

/// Write all tracks of one frame.
pub fn write_tracks<W: Write>(writer: &mut W, frame: u64, tracks: &[TrackSnapshot]) -> Result<()> {
    for track in tracks {
        writeln!(writer, "{}", format_track(frame, track))?;
    }
    Ok(())
}
