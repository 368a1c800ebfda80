use std::sync::Arc;

use democast_model::{CaptureTimeline, EffectsConfig, Point, ResolvedFrame, ViewportSize};
use democast_processing_core::{
    apply_speed_ramp, compute_frame_contexts, interpolate_path, resample, SpeedPreset,
};

/// A sparse capture: a cursor glide toward (640, 400), a click there at
/// t=1200ms, and only five raw samples over three seconds.
fn sparse_capture() -> (CaptureTimeline, Vec<ResolvedFrame>) {
    let mut timeline = CaptureTimeline::seeded(Point::ORIGIN, 0.0);
    let preset = SpeedPreset::for_speed(democast_model::CursorSpeed::Normal);
    let path = interpolate_path(Point::ORIGIN, Point::new(640.0, 400.0), preset.steps);
    let mut t = 1000.0;
    for p in path {
        timeline.push_cursor(p, t);
        t += preset.delay_ms as f64;
    }
    timeline.push_click(Point::new(640.0, 400.0), 1200.0);

    let raw = [0.0, 400.0, 1100.0, 1250.0, 3000.0]
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            timeline.resolve_frame(i, Arc::from(vec![i as u8]), ts, ViewportSize::default())
        })
        .collect();
    (timeline, raw)
}

#[test]
fn resampled_sequence_has_exact_rate_and_fresh_overlays() {
    let (timeline, raw) = sparse_capture();
    let frames = resample(raw, &timeline, 3000.0, 30);

    assert_eq!(frames.len(), 90);
    assert!(frames.iter().enumerate().all(|(i, f)| f.index == i));
    assert!(frames.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

    // Only five distinct images back ninety frames.
    let mut distinct: Vec<u8> = frames.iter().map(|f| f.image[0]).collect();
    distinct.dedup();
    assert_eq!(distinct.len(), 5);

    // Click ripple progress rises monotonically inside its window.
    let progress: Vec<f64> = frames.iter().filter_map(|f| f.click_progress).collect();
    assert!(progress.len() >= 10);
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert!(frames
        .iter()
        .filter(|f| f.timestamp > 1700.0)
        .all(|f| f.click_progress.is_none()));
}

#[test]
fn contexts_follow_click_frames_after_speed_ramp() {
    let (timeline, raw) = sparse_capture();
    let frames = resample(raw, &timeline, 3000.0, 30);

    let mut effects = EffectsConfig::default();
    effects.speed_ramp.enabled = true;
    effects.speed_ramp.action_speed = 0.5;
    let ramped = apply_speed_ramp(&frames, &effects.speed_ramp, 30);
    assert!(ramped.iter().enumerate().all(|(i, f)| f.index == i));

    let contexts = compute_frame_contexts(&ramped, &effects, 30);
    assert_eq!(contexts.len(), ramped.len());
    for (frame, ctx) in ramped.iter().zip(&contexts) {
        assert!(ctx.zoom_scale >= 1.0);
        if frame.click_position.is_some() {
            assert_eq!(ctx.zoom_scale, effects.zoom.scale);
            assert!(ctx.click_progress.is_some());
        }
        assert!(ctx.cursor_trail.len() <= effects.cursor.trail_length + 1);
    }
}
