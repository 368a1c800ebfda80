//! Fixed-rate resampling.
//!
//! Screencasts emit on visual change, so a capture is irregular: bursts
//! during motion, long gaps during a hold. Resampling spreads
//! `round(duration * fps)` output frames evenly over the capture span. Each
//! output frame reuses the image of the nearest raw frame but re-derives
//! cursor, click and keystroke state at its own timestamp, so duplicated
//! images still show moving overlays.

use democast_model::{CaptureTimeline, ResolvedFrame};

/// Resample `frames` to `fps` over `duration_ms`.
///
/// Never drops frames: when the target count does not exceed the input
/// length the input is returned as-is. Equidistant raw frames resolve to
/// the first one in scan order.
pub fn resample(
    frames: Vec<ResolvedFrame>,
    timeline: &CaptureTimeline,
    duration_ms: f64,
    fps: u32,
) -> Vec<ResolvedFrame> {
    if frames.is_empty() {
        return frames;
    }

    let wanted = (duration_ms / 1000.0 * fps as f64).round();
    let target = if wanted.is_finite() && wanted > frames.len() as f64 {
        wanted as usize
    } else {
        frames.len()
    };
    if target <= frames.len() {
        return frames;
    }

    let start = frames[0].timestamp;
    let end = frames[frames.len() - 1].timestamp;
    let span = (end - start).max(1.0);

    tracing::debug!(
        raw = frames.len(),
        target,
        duration_ms,
        fps,
        "Resampling capture"
    );

    let mut out = Vec::with_capacity(target);
    for i in 0..target {
        let t = start + (i as f64 / (target - 1) as f64) * span;
        let nearest = &frames[nearest_index(&frames, t)];
        out.push(timeline.resolve_frame_in_step(
            i,
            nearest.image.clone(),
            t,
            nearest.viewport,
            nearest.step_index,
        ));
    }
    out
}

/// Index of the frame closest to `t`; the first wins on ties.
fn nearest_index(frames: &[ResolvedFrame], t: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, frame) in frames.iter().enumerate() {
        let dist = (frame.timestamp - t).abs();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}
