//! democast processing core
//!
//! Turns a recorded capture into per-frame render decisions:
//! - **Cursor paths:** eased, curved synthetic movement between two points
//! - **Resampling:** variable-rate capture to an exact frame rate, with
//!   overlay state re-derived from the timelines
//! - **Speed ramp:** slow down around clicks, skip through idle stretches
//! - **Adaptive zoom:** scale as a function of distance to the nearest click
//! - **Frame contexts:** zoom, click progress, and cursor trail per frame
//! - **Transitions:** crossfades across step boundaries
//!
//! This crate is pure computation: no I/O, no async, no pixels beyond the
//! crossfade blend. All inputs are data; all outputs are data.

pub mod context;
pub mod cursor_path;
pub mod resample;
pub mod speed_ramp;
pub mod transition;
pub mod zoom;

pub use context::compute_frame_contexts;
pub use cursor_path::{ease_in_out_cubic, interpolate_path, smooth_path, SpeedPreset};
pub use resample::resample;
pub use speed_ramp::apply_speed_ramp;
pub use transition::{apply_crossfades, blend, fade_boundaries};
pub use zoom::AdaptiveZoom;
