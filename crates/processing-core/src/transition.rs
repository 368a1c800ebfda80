//! Step-boundary crossfades.
//!
//! Runs after compositing, directly on the rendered buffers. For each
//! boundary a window of `max(2, round(0.3 * fps))` frames is centred on the
//! boundary index; interior frames are replaced by a linear blend of the
//! window's two endpoint frames. Windows are processed in order and read
//! their endpoints from the buffers as they stand, so when two windows
//! overlap the later one blends from frames the earlier one already wrote.

use democast_model::{RenderedFrame, ResolvedFrame, RgbaFrame, Step, Transition};

/// Per-channel linear blend: `round(from * (1 - t) + to * t)`.
///
/// Both frames are expected to share dimensions; the result takes `from`'s
/// size and blends over the common prefix of the two buffers.
pub fn blend(from: &RgbaFrame, to: &RgbaFrame, t: f64) -> RgbaFrame {
    let t = t.clamp(0.0, 1.0);
    let data = from
        .data
        .iter()
        .zip(&to.data)
        .map(|(&a, &b)| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8)
        .collect();
    RgbaFrame {
        width: from.width,
        height: from.height,
        data,
    }
}

/// Indices where the step changes into a step whose transition is `fade`.
pub fn fade_boundaries(frames: &[ResolvedFrame], steps: &[Step]) -> Vec<usize> {
    frames
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].step_index != pair[1].step_index)
        .filter(|(_, pair)| {
            steps
                .get(pair[1].step_index)
                .is_some_and(|s| s.transition == Transition::Fade)
        })
        .map(|(i, _)| i + 1)
        .collect()
}

/// Inclusive `(start, end)` window around `boundary`, or `None` when the
/// clamped window has no interior frame to blend.
pub fn crossfade_window(boundary: usize, len: usize, fps: u32) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let width = ((fps as f64 * 0.3).round() as usize).max(2);
    let start = boundary.saturating_sub(width / 2);
    let end = (boundary + width.div_ceil(2)).min(len - 1);
    (end >= start + 2).then_some((start, end))
}

/// Blend every boundary window in place.
pub fn apply_crossfades(rendered: &mut [RenderedFrame], boundaries: &[usize], fps: u32) {
    for &boundary in boundaries {
        let Some((start, end)) = crossfade_window(boundary, rendered.len(), fps) else {
            continue;
        };
        let from = rendered[start].pixels.clone();
        let to = rendered[end].pixels.clone();
        let range = (end - start) as f64;
        for i in start + 1..end {
            rendered[i].pixels = blend(&from, &to, (i - start) as f64 / range);
        }
        tracing::debug!(boundary, start, end, "Applied crossfade");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use democast_model::{CaptureTimeline, Point, ViewportSize};
    use std::sync::Arc;

    fn solid(v: u8) -> RgbaFrame {
        RgbaFrame::filled(2, 2, [v, v, v, 255])
    }

    fn rendered(values: &[u8]) -> Vec<RenderedFrame> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| RenderedFrame {
                index: i,
                pixels: solid(v),
                timestamp: i as f64,
            })
            .collect()
    }

    fn value(frame: &RenderedFrame) -> u8 {
        frame.pixels.data[0]
    }

    #[test]
    fn test_blend_endpoints_and_midpoint() {
        let a = RgbaFrame::from_raw(1, 1, vec![10, 200, 0, 255]).unwrap();
        let b = RgbaFrame::from_raw(1, 1, vec![30, 100, 255, 255]).unwrap();
        assert_eq!(blend(&a, &b, 0.0), a);
        assert_eq!(blend(&a, &b, 1.0), b);
        assert_eq!(blend(&a, &b, 0.5).data, vec![20, 150, 128, 255]);
    }

    #[test]
    fn test_window_shape() {
        // fps 30 => W = 9 => [b-4, b+5]
        assert_eq!(crossfade_window(20, 100, 30), Some((16, 25)));
        // fps 1 => W = 2 => [b-1, b+1]
        assert_eq!(crossfade_window(5, 10, 1), Some((4, 6)));
        // clamped at the ends
        assert_eq!(crossfade_window(1, 100, 30), Some((0, 6)));
        assert_eq!(crossfade_window(9, 10, 1), None);
        assert_eq!(crossfade_window(0, 0, 30), None);
    }

    #[test]
    fn test_interior_frames_blended_endpoints_untouched() {
        let mut frames = rendered(&[0, 0, 0, 0, 100, 100, 100, 100]);
        // fps 10 => W = 3 => window [3, 6]
        apply_crossfades(&mut frames, &[4], 10);
        let values: Vec<u8> = frames.iter().map(value).collect();
        assert_eq!(values, vec![0, 0, 0, 0, 33, 67, 100, 100]);
    }

    #[test]
    fn test_overlapping_windows_compound() {
        // fps 20 => W = 6 => windows [b-3, b+3]
        let mut frames = rendered(&[0, 0, 0, 0, 60, 60, 120, 120, 120, 120]);
        apply_crossfades(&mut frames, &[4, 6], 20);
        let values: Vec<u8> = frames.iter().map(value).collect();

        // First window [1, 7] blends 0 -> 120, writing frames 2..=6.
        // Second window [3, 9] then reads frame 3 as already blended (40)
        // and fades 40 -> 120 over frames 4..=8.
        assert_eq!(value(&frames[1]), 0);
        assert_eq!(values[2], 20);
        assert_eq!(values[3], 40);
        assert_eq!(&values[4..9], &[53, 67, 80, 93, 107]);
        assert_eq!(values[9], 120);
    }

    #[test]
    fn test_fade_boundaries_only_for_fade_steps() {
        let steps: Vec<Step> = three_steps();
        let tl = CaptureTimeline::seeded(Point::ORIGIN, 0.0);
        let frames: Vec<ResolvedFrame> = [0usize, 0, 1, 1, 2, 2]
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                tl.resolve_frame_in_step(i, Arc::from(vec![]), i as f64, ViewportSize::default(), s)
            })
            .collect();
        assert_eq!(fade_boundaries(&frames, &steps), vec![4]);
    }

    fn three_steps() -> Vec<Step> {
        vec![
            step(Transition::None),
            step(Transition::None),
            step(Transition::Fade),
        ]
    }

    fn step(transition: Transition) -> Step {
        Step {
            name: None,
            actions: Vec::new(),
            capture_delay: 0,
            hold_duration: 0,
            transition,
        }
    }
}
