//! Replay a MOTChallenge detection file through the SORT tracker.
//!
//! ```text
//! sort-replay --input MOT17-04/det/det.txt --output MOT17-04.txt --max-age 3
//! ```

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use sort_tracker::integration::mot;
use sort_tracker::{SortTracker, TrackerConfig};

#[derive(Debug, Parser)]
#[command(name = "sort-replay", version, about = "Run SORT over a MOTChallenge det.txt")]
struct Args {
    /// Detection file (frame,id,x,y,w,h,conf,...)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write tracks; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Frames a track survives without a matching detection
    #[arg(long, default_value_t = 1)]
    max_age: u32,

    /// Consecutive matches before a track is reported
    #[arg(long, default_value_t = 3)]
    min_hits: u32,

    /// Minimum IoU for a match
    #[arg(long, default_value_t = 0.3)]
    iou_threshold: f64,

    /// Minimum confidence for a detection to start a track
    #[arg(long, default_value_t = 0.0)]
    min_score: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = TrackerConfig {
        iou_gate_threshold: args.iou_threshold,
        min_hits_to_confirm: args.min_hits,
        max_age_frames: args.max_age,
        min_score: args.min_score,
        ..TrackerConfig::default()
    };
    let mut tracker = SortTracker::new(config)?;

    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let frames = mot::read_detections(BufReader::new(file))
        .with_context(|| format!("reading {}", args.input.display()))?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut confirmed_ids = BTreeSet::new();
    let mut rejected = 0;
    for detections in &frames {
        let out = tracker.step(detections);
        rejected += out.rejected.len();
        confirmed_ids.extend(out.tracks.iter().map(|t| t.track_id));
        mot::write_tracks(&mut writer, out.frame_id, &out.tracks)?;
    }
    writer.flush()?;

    log::info!(
        "{} frames, {} confirmed tracks, {} detections rejected",
        frames.len(),
        confirmed_ids.len(),
        rejected
    );

    Ok(())
}
