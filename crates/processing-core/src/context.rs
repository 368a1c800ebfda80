//! Per-frame render contexts.

use democast_model::{EffectsConfig, FrameContext, ResolvedFrame};

use crate::zoom::AdaptiveZoom;

/// Ripple progress used when a frame has a click position but no progress.
const DEFAULT_CLICK_PROGRESS: f64 = 0.5;

/// One context per frame: zoom scale, click progress, cursor trail.
pub fn compute_frame_contexts(
    frames: &[ResolvedFrame],
    effects: &EffectsConfig,
    fps: u32,
) -> Vec<FrameContext> {
    let scales = if effects.zoom.enabled {
        AdaptiveZoom::from_config(&effects.zoom, fps).scales(frames)
    } else {
        vec![1.0; frames.len()]
    };
    let trail_length = effects.cursor.trail_length;

    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let click_progress = frame
                .click_position
                .map(|_| frame.click_progress.unwrap_or(DEFAULT_CLICK_PROGRESS));
            let cursor_trail = frames[i.saturating_sub(trail_length)..=i]
                .iter()
                .filter_map(|f| f.cursor_position)
                .collect();
            FrameContext {
                zoom_scale: scales[i],
                click_progress,
                cursor_trail,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use democast_model::{CaptureTimeline, Point, ViewportSize};
    use std::sync::Arc;

    fn moving_frames(n: usize) -> Vec<ResolvedFrame> {
        let mut tl = CaptureTimeline::seeded(Point::ORIGIN, 0.0);
        tl.push_cursor(Point::new(n as f64 * 10.0, 0.0), n as f64 * 10.0);
        (0..n)
            .map(|i| tl.resolve_frame(i, Arc::from(vec![]), i as f64 * 10.0, ViewportSize::default()))
            .collect()
    }

    #[test]
    fn test_trail_window() {
        let frames = moving_frames(12);
        let mut effects = EffectsConfig::default();
        effects.cursor.trail_length = 3;
        let ctx = compute_frame_contexts(&frames, &effects, 30);

        assert_eq!(ctx[0].cursor_trail, vec![Point::new(0.0, 0.0)]);
        assert_eq!(ctx[5].cursor_trail.len(), 4);
        assert_eq!(ctx[5].cursor_trail.first(), Some(&Point::new(20.0, 0.0)));
        assert_eq!(ctx[5].cursor_trail.last(), Some(&Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_trail_skips_frames_without_cursor() {
        let mut frames = moving_frames(4);
        frames[2].cursor_position = None;
        let mut effects = EffectsConfig::default();
        effects.cursor.trail_length = 8;
        let ctx = compute_frame_contexts(&frames, &effects, 30);
        assert_eq!(ctx[3].cursor_trail.len(), 3);
    }

    #[test]
    fn test_click_progress_defaults() {
        let mut frames = moving_frames(3);
        frames[1].click_position = Some(Point::new(5.0, 5.0));
        frames[1].click_progress = None;
        frames[2].click_position = Some(Point::new(5.0, 5.0));
        frames[2].click_progress = Some(0.25);
        let ctx = compute_frame_contexts(&frames, &EffectsConfig::default(), 30);

        assert_eq!(ctx[0].click_progress, None);
        assert_eq!(ctx[1].click_progress, Some(0.5));
        assert_eq!(ctx[2].click_progress, Some(0.25));
    }

    #[test]
    fn test_zoom_disabled_is_unit_scale() {
        let mut frames = moving_frames(5);
        frames[2].click_position = Some(Point::new(5.0, 5.0));
        let mut effects = EffectsConfig::default();
        effects.zoom.enabled = false;
        let ctx = compute_frame_contexts(&frames, &effects, 30);
        assert!(ctx.iter().all(|c| c.zoom_scale == 1.0));

        effects.zoom.enabled = true;
        let ctx = compute_frame_contexts(&frames, &effects, 30);
        assert_eq!(ctx[2].zoom_scale, effects.zoom.scale);
    }
}
