//! Speed ramping: linger on actions, skim through idle stretches.

use democast_model::{ResolvedFrame, SpeedRampConfig};

/// Re-time a frame sequence around clicks.
///
/// Frames within `round(fps)` frames of a click-carrying frame are action
/// frames and are repeated `max(1, round(1 / action_speed))` times. Idle
/// frames survive only when their index is a multiple of
/// `max(1, round(idle_speed))`. Output indices are contiguous from zero.
pub fn apply_speed_ramp(
    frames: &[ResolvedFrame],
    config: &SpeedRampConfig,
    fps: u32,
) -> Vec<ResolvedFrame> {
    let radius = fps as usize;
    let mut is_action = vec![false; frames.len()];
    for (i, frame) in frames.iter().enumerate() {
        if frame.click_position.is_some() {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(frames.len() - 1);
            is_action[lo..=hi].iter_mut().for_each(|a| *a = true);
        }
    }

    let copies = repeat_count(1.0 / config.action_speed);
    let skip = repeat_count(config.idle_speed);

    let mut out = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let n = if is_action[i] {
            copies
        } else if i % skip == 0 {
            1
        } else {
            0
        };
        for _ in 0..n {
            let mut f = frame.clone();
            f.index = out.len();
            out.push(f);
        }
    }

    tracing::debug!(
        before = frames.len(),
        after = out.len(),
        action_frames = is_action.iter().filter(|a| **a).count(),
        "Applied speed ramp"
    );
    out
}

fn repeat_count(x: f64) -> usize {
    let n = x.round();
    if n.is_finite() && n >= 1.0 {
        n as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use democast_model::{CaptureTimeline, Point, ViewportSize};
    use std::sync::Arc;

    fn frames(n: usize, click_at: Option<usize>) -> Vec<ResolvedFrame> {
        let tl = CaptureTimeline::seeded(Point::ORIGIN, 0.0);
        (0..n)
            .map(|i| {
                let mut f = tl.resolve_frame(i, Arc::from(vec![i as u8]), i as f64, ViewportSize::default());
                if Some(i) == click_at {
                    f.click_position = Some(Point::new(1.0, 1.0));
                }
                f
            })
            .collect()
    }

    fn config(idle: f64, action: f64) -> SpeedRampConfig {
        SpeedRampConfig {
            enabled: true,
            idle_speed: idle,
            action_speed: action,
            ..SpeedRampConfig::default()
        }
    }

    #[test]
    fn test_idle_only_skips() {
        let out = apply_speed_ramp(&frames(10, None), &config(3.0, 0.8), 2);
        let kept: Vec<u8> = out.iter().map(|f| f.image[0]).collect();
        assert_eq!(kept, vec![0, 3, 6, 9]);
        assert!(out.iter().enumerate().all(|(i, f)| f.index == i));
    }

    #[test]
    fn test_action_frames_duplicated() {
        // fps 2 => radius 2 around frame 5 => frames 3..=7 are action.
        let out = apply_speed_ramp(&frames(10, Some(5)), &config(3.0, 0.5), 2);
        let kept: Vec<u8> = out.iter().map(|f| f.image[0]).collect();
        assert_eq!(kept, vec![0, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 9]);
        assert!(out.iter().enumerate().all(|(i, f)| f.index == i));
    }

    #[test]
    fn test_unit_speeds_are_identity() {
        let input = frames(6, Some(0));
        let out = apply_speed_ramp(&input, &config(1.0, 1.0), 30);
        assert_eq!(out, input);
    }

    #[test]
    fn test_empty() {
        assert!(apply_speed_ramp(&[], &config(3.0, 0.8), 30).is_empty());
    }
}
