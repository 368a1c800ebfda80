//! Adaptive zoom.
//!
//! The camera pushes in around clicks and relaxes back to 1x over a
//! transition window measured in frames:
//!
//! ```text
//!  scale
//!   max ┤        ╭╮
//!       │      ╭╯  ╰╮
//!     1 ┼──────╯    ╰──────
//!             ◀─T─▶◀─T─▶
//!               click
//! ```

use democast_model::{ResolvedFrame, ZoomConfig};

use crate::cursor_path::ease_in_out_cubic;

/// Zoom envelope parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveZoom {
    /// Scale reached on a click frame.
    pub max_scale: f64,
    /// Half-width of the envelope, in frames.
    pub transition_frames: usize,
}

impl AdaptiveZoom {
    pub fn new(max_scale: f64, transition_frames: usize) -> Self {
        Self {
            max_scale,
            transition_frames,
        }
    }

    /// Envelope for a zoom config at the given output rate:
    /// `transition_frames = round(fps * duration / 1000)`.
    pub fn from_config(config: &ZoomConfig, fps: u32) -> Self {
        let frames = (fps as f64 * config.duration as f64 / 1000.0).round();
        Self::new(config.scale, frames.max(0.0) as usize)
    }

    /// Scale for a frame at distance `d` (in frames) from the nearest click.
    pub fn scale_at_distance(&self, d: usize) -> f64 {
        if self.max_scale <= 1.0 {
            return 1.0;
        }
        if d == 0 {
            return self.max_scale;
        }
        if d > self.transition_frames {
            return 1.0;
        }
        let t = 1.0 - d as f64 / self.transition_frames as f64;
        1.0 + (self.max_scale - 1.0) * ease_in_out_cubic(t)
    }

    /// Scale for every frame. A frame "carries a click" when it has a
    /// click position; without any such frame every scale is 1.
    pub fn scales(&self, frames: &[ResolvedFrame]) -> Vec<f64> {
        let click_frames: Vec<usize> = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.click_position.is_some())
            .map(|(i, _)| i)
            .collect();

        (0..frames.len())
            .map(|i| match nearest_distance(&click_frames, i) {
                Some(d) => self.scale_at_distance(d),
                None => 1.0,
            })
            .collect()
    }
}

/// Distance from `i` to the closest entry of the sorted `indices`.
fn nearest_distance(indices: &[usize], i: usize) -> Option<usize> {
    let pos = indices.partition_point(|&c| c < i);
    let after = indices.get(pos).map(|&c| c - i);
    let before = pos.checked_sub(1).map(|p| i - indices[p]);
    match (before, after) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
