use approx::assert_abs_diff_eq;
use sort_tracker::{Detection, FrameOutput, Rect, SortTracker, TrackerConfig};

fn tracker_with(min_hits: u32, max_age: u32) -> SortTracker {
    SortTracker::new(TrackerConfig {
        min_hits_to_confirm: min_hits,
        max_age_frames: max_age,
        ..TrackerConfig::default()
    })
    .unwrap()
}

fn ids(out: &FrameOutput) -> Vec<u64> {
    out.tracks.iter().map(|t| t.track_id).collect()
}

#[test]
fn test_end_to_end_lifecycle() {
    let mut tracker = tracker_with(1, 1);

    // Frame 1: new track, confirmed straight away
    let out1 = tracker.step(&[Detection::new(10.0, 10.0, 50.0, 50.0, 0.9)]);
    assert_eq!(ids(&out1), vec![1]);
    let b1 = out1.tracks[0].bbox;
    assert_abs_diff_eq!(b1.x_min, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b1.y_min, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b1.x_max, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b1.y_max, 50.0, epsilon = 1e-9);

    // Frame 2: slight drift still matches the same identity
    let out2 = tracker.step(&[Detection::new(12.0, 11.0, 52.0, 51.0, 0.9)]);
    assert_eq!(ids(&out2), vec![1]);
    let b2 = out2.tracks[0].bbox;
    assert_abs_diff_eq!(b2.x_min, 12.0, epsilon = 0.5);
    assert_abs_diff_eq!(b2.y_min, 11.0, epsilon = 0.5);
    assert_abs_diff_eq!(b2.x_max, 52.0, epsilon = 0.5);
    assert_abs_diff_eq!(b2.y_max, 51.0, epsilon = 0.5);

    // Frame 3: missed once, still reported at the predicted position
    let out3 = tracker.step(&[]);
    assert_eq!(ids(&out3), vec![1]);
    let b3 = out3.tracks[0].bbox;
    assert!(b3.x_min > b2.x_min + 1.0, "prediction should keep moving right");
    assert_eq!(out3.tracks[0].time_since_update, 1);

    // Frame 4: missed twice, deleted
    let out4 = tracker.step(&[]);
    assert!(out4.tracks.is_empty());
    assert_eq!(out4.deleted, vec![1]);
    assert!(tracker.live_tracks().is_empty());
}

#[test]
fn test_empty_stream_stays_empty() {
    let mut tracker = SortTracker::new(TrackerConfig::default()).unwrap();
    for _ in 0..10 {
        let out = tracker.step(&[]);
        assert!(out.tracks.is_empty());
    }
    assert!(tracker.live_tracks().is_empty());
}

#[test]
fn test_confirmation_after_min_hits() {
    let mut tracker = tracker_with(3, 1);
    for _ in 0..5 {
        tracker.step(&[]);
    }

    let det = Detection::new(100.0, 100.0, 140.0, 180.0, 0.8);
    assert!(tracker.step(&[det]).tracks.is_empty());
    assert!(tracker.step(&[det]).tracks.is_empty());

    let out = tracker.step(&[det]);
    assert_eq!(ids(&out), vec![1]);
    assert_eq!(out.tracks[0].hit_streak, 3);

    for _ in 0..5 {
        assert_eq!(ids(&tracker.step(&[det])), vec![1]);
    }
}

#[test]
fn test_deleted_id_is_never_reused() {
    let mut tracker = tracker_with(1, 1);
    let det = Detection::new(10.0, 10.0, 50.0, 50.0, 0.9);

    for _ in 0..3 {
        assert_eq!(ids(&tracker.step(&[det])), vec![1]);
    }
    tracker.step(&[]);
    let out = tracker.step(&[]);
    assert!(out.tracks.is_empty());

    // Same place, new identity
    let out = tracker.step(&[det]);
    assert_eq!(ids(&out), vec![2]);
}

#[test]
fn test_larger_max_age_coasts_through_gaps() {
    let mut tracker = tracker_with(1, 3);
    let at = |x: f64| Detection::new(x, 50.0, x + 40.0, 90.0, 0.9);

    for frame in 0..6 {
        tracker.step(&[at(5.0 * frame as f64)]);
    }
    // two missed frames while the object keeps moving
    assert_eq!(ids(&tracker.step(&[])), vec![1]);
    assert_eq!(ids(&tracker.step(&[])), vec![1]);

    let out = tracker.step(&[at(5.0 * 8.0)]);
    assert_eq!(ids(&out), vec![1]);
    assert_eq!(out.tracks[0].time_since_update, 0);
}

#[test]
fn test_two_objects_get_distinct_ids() {
    let mut tracker = tracker_with(1, 1);
    let out = tracker.step(&[
        Detection::new(0.0, 0.0, 20.0, 20.0, 0.9),
        Detection::new(200.0, 200.0, 230.0, 240.0, 0.9),
    ]);
    assert_eq!(ids(&out), vec![1, 2]);
}

// A walks right along the top lane, B walks left along the bottom one; their
// x ranges swap sides around frame 18.
fn crossing_sequence(swap: bool) -> Vec<Vec<Detection>> {
    (0..24)
        .map(|f| {
            let f = f as f64;
            let a = Detection::new(10.0 + 8.0 * f, 10.0, 50.0 + 8.0 * f, 60.0, 0.9);
            let b = Detection::new(300.0 - 8.0 * f, 70.0, 340.0 - 8.0 * f, 120.0, 0.7);
            if swap { vec![b, a] } else { vec![a, b] }
        })
        .collect()
}

#[test]
fn test_input_order_does_not_change_identities() {
    let mut straight = tracker_with(1, 1);
    let mut swapped = tracker_with(1, 1);

    for (dets, dets_swapped) in crossing_sequence(false)
        .iter()
        .zip(crossing_sequence(true).iter())
    {
        let a = straight.step(dets);
        let b = swapped.step(dets_swapped);
        assert_eq!(a.tracks, b.tracks);
    }

    // A started on the left and kept id 1 after passing B
    let last = straight.live_tracks();
    assert_eq!(last.len(), 2);
    assert_eq!((last[0].track_id, last[1].track_id), (1, 2));
    assert!(last[0].bbox.x_min > last[1].bbox.x_min + 50.0);
}

#[test]
fn test_identical_input_gives_identical_output() {
    let frames: Vec<Vec<Detection>> = (0..30)
        .map(|f| {
            let f = f as f64;
            let mut dets = vec![Detection::new(f * 2.0, 0.0, f * 2.0 + 30.0, 30.0, 0.9)];
            if (f as u32) % 4 != 0 {
                dets.push(Detection::new(100.0, f, 150.0, f + 60.0, 0.6));
            }
            if (f as u32) % 7 == 3 {
                dets.push(Detection::new(400.0, 400.0, 410.0, 405.0, 0.3));
            }
            dets
        })
        .collect();

    let mut a = SortTracker::new(TrackerConfig::default()).unwrap();
    let mut b = SortTracker::new(TrackerConfig::default()).unwrap();
    for dets in &frames {
        assert_eq!(a.step(dets), b.step(dets));
    }
}

#[test]
fn test_invalid_detection_does_not_stop_the_frame() {
    let mut tracker = tracker_with(1, 1);
    let out = tracker.step(&[
        Detection::new(10.0, 10.0, 10.0, 50.0, 0.9),
        Detection::new(60.0, 60.0, 90.0, 90.0, 0.9),
        Detection::new(0.0, 0.0, 5.0, f64::NAN, 0.9),
    ]);
    let rejected: Vec<usize> = out.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![0, 2]);
    assert_eq!(ids(&out), vec![1]);
}

#[test]
fn test_degenerate_track_is_force_deleted() {
    let mut tracker = tracker_with(1, 5);
    // area overflows to infinity inside the motion model
    let out = tracker.step(&[Detection::new(-1e300, -1e300, 1e300, 1e300, 0.9)]);
    assert_eq!(ids(&out), vec![1]);

    let out = tracker.step(&[]);
    assert!(out.tracks.is_empty());
    assert_eq!(out.deleted, vec![1]);

    // the tracker keeps working
    let out = tracker.step(&[Detection::new(0.0, 0.0, 10.0, 10.0, 0.9)]);
    assert_eq!(ids(&out), vec![2]);
}

#[test]
fn test_iou_properties() {
    let a = Rect::new(10.0, 10.0, 50.0, 50.0);
    let b = Rect::new(30.0, 20.0, 70.0, 45.0);
    let c = Rect::new(100.0, 100.0, 120.0, 120.0);

    assert_eq!(a.iou(&a), 1.0);
    assert_eq!(a.iou(&c), 0.0);
    assert_eq!(a.iou(&b), b.iou(&a));
    assert!(a.iou(&b) > 0.0 && a.iou(&b) < 1.0);
}

#[test]
fn test_separate_trackers_have_separate_ids() {
    let mut first = tracker_with(1, 1);
    let mut second = tracker_with(1, 1);
    let det = Detection::new(0.0, 0.0, 10.0, 10.0, 0.9);

    assert_eq!(ids(&first.step(&[det])), vec![1]);
    assert_eq!(ids(&second.step(&[det])), vec![1]);
}
