//! Capture timelines.
//!
//! A recording keeps three append-only event sequences (cursor keyframes,
//! clicks, keystrokes) plus step markers, all stamped on the same recording
//! clock. Per-frame state is always re-derived from these sequences at the
//! frame's own timestamp rather than copied from a neighbouring sample.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::frame::ResolvedFrame;
use crate::geometry::{Point, ViewportSize};

/// Length of the click-ripple window after each click.
pub const CLICK_EFFECT_DURATION_MS: f64 = 500.0;

/// Milliseconds on the recording clock.
pub type TimestampMs = f64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorKeyframe {
    pub position: Point,
    pub timestamp: TimestampMs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub position: Point,
    pub timestamp: TimestampMs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub key: String,
    pub timestamp: TimestampMs,
}

/// Marks the moment a scripted step began executing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepMarker {
    pub step_index: usize,
    pub timestamp: TimestampMs,
}

/// The event side of a capture.
///
/// Push methods keep every sequence timestamp-monotonic: an event stamped
/// earlier than the current tail is clamped to the tail's timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureTimeline {
    cursor: Vec<CursorKeyframe>,
    clicks: Vec<ClickEvent>,
    keystrokes: Vec<KeystrokeEvent>,
    steps: Vec<StepMarker>,
}

fn monotonic(last: Option<TimestampMs>, t: TimestampMs) -> TimestampMs {
    match last {
        Some(prev) if t < prev => prev,
        _ => t,
    }
}

impl CaptureTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timeline seeded with the starting cursor position.
    pub fn seeded(position: Point, timestamp: TimestampMs) -> Self {
        let mut timeline = Self::new();
        timeline.push_cursor(position, timestamp);
        timeline
    }

    pub fn push_cursor(&mut self, position: Point, timestamp: TimestampMs) {
        let timestamp = monotonic(self.cursor.last().map(|k| k.timestamp), timestamp);
        self.cursor.push(CursorKeyframe {
            position,
            timestamp,
        });
    }

    pub fn push_click(&mut self, position: Point, timestamp: TimestampMs) {
        let timestamp = monotonic(self.clicks.last().map(|c| c.timestamp), timestamp);
        self.clicks.push(ClickEvent {
            position,
            timestamp,
        });
    }

    pub fn push_keystroke(&mut self, key: impl Into<String>, timestamp: TimestampMs) {
        let timestamp = monotonic(self.keystrokes.last().map(|k| k.timestamp), timestamp);
        self.keystrokes.push(KeystrokeEvent {
            key: key.into(),
            timestamp,
        });
    }

    pub fn mark_step(&mut self, step_index: usize, timestamp: TimestampMs) {
        let timestamp = monotonic(self.steps.last().map(|s| s.timestamp), timestamp);
        self.steps.push(StepMarker {
            step_index,
            timestamp,
        });
    }

    pub fn cursor(&self) -> &[CursorKeyframe] {
        &self.cursor
    }

    pub fn clicks(&self) -> &[ClickEvent] {
        &self.clicks
    }

    pub fn keystrokes(&self) -> &[KeystrokeEvent] {
        &self.keystrokes
    }

    pub fn steps(&self) -> &[StepMarker] {
        &self.steps
    }

    /// Cursor position at `t`: linear interpolation between the bracketing
    /// keyframes, clamped to the first/last keyframe outside the timeline,
    /// rounded to whole pixels. `None` only for an empty cursor timeline.
    pub fn cursor_at(&self, t: TimestampMs) -> Option<Point> {
        let first = self.cursor.first()?;
        let last = self.cursor.last()?;
        if t <= first.timestamp {
            return Some(first.position.rounded());
        }
        if t >= last.timestamp {
            return Some(last.position.rounded());
        }

        // First keyframe strictly after t; t < last.timestamp so it exists
        // and has a predecessor.
        let next = self.cursor.partition_point(|k| k.timestamp <= t);
        let a = &self.cursor[next - 1];
        let b = &self.cursor[next];
        let span = b.timestamp - a.timestamp;
        let frac = if span > 0.0 {
            (t - a.timestamp) / span
        } else {
            0.0
        };
        Some(Point::lerp(a.position, b.position, frac).rounded())
    }

    /// The nearest click at or before `t` and its ripple progress, when `t`
    /// falls inside that click's effect window.
    pub fn click_at(&self, t: TimestampMs) -> Option<(Point, f64)> {
        let idx = self.clicks.partition_point(|c| c.timestamp <= t);
        let click = self.clicks.get(idx.checked_sub(1)?)?;
        let elapsed = t - click.timestamp;
        if elapsed > CLICK_EFFECT_DURATION_MS {
            return None;
        }
        let progress = (elapsed / CLICK_EFFECT_DURATION_MS).clamp(0.0, 1.0);
        Some((click.position, progress))
    }

    /// All keystrokes stamped at or before `t`.
    pub fn keystrokes_until(&self, t: TimestampMs) -> Vec<KeystrokeEvent> {
        let end = self.keystrokes.partition_point(|k| k.timestamp <= t);
        self.keystrokes[..end].to_vec()
    }

    /// Index of the step executing at `t` (0 before the first marker).
    pub fn step_at(&self, t: TimestampMs) -> usize {
        let idx = self.steps.partition_point(|s| s.timestamp <= t);
        idx.checked_sub(1)
            .map(|i| self.steps[i].step_index)
            .unwrap_or(0)
    }

    /// Build a frame for an image observed at `t`, deriving every piece of
    /// overlay state from the timelines.
    pub fn resolve_frame(
        &self,
        index: usize,
        image: Arc<[u8]>,
        t: TimestampMs,
        viewport: ViewportSize,
    ) -> ResolvedFrame {
        self.resolve_frame_in_step(index, image, t, viewport, self.step_at(t))
    }

    /// Like [`resolve_frame`](Self::resolve_frame) with an explicit step
    /// index.
    pub fn resolve_frame_in_step(
        &self,
        index: usize,
        image: Arc<[u8]>,
        t: TimestampMs,
        viewport: ViewportSize,
        step_index: usize,
    ) -> ResolvedFrame {
        let click = self.click_at(t);
        ResolvedFrame {
            index,
            image,
            timestamp: t,
            cursor_position: self.cursor_at(t),
            click_position: click.map(|(p, _)| p),
            click_progress: click.map(|(_, progress)| progress),
            viewport,
            step_index,
            keystrokes_active: self.keystrokes_until(t),
        }
    }
}

/// Result of a recording run: the frozen timeline plus the resolved,
/// resampled frame sequence.
#[derive(Debug, Clone, Default)]
pub struct RecordedSession {
    pub frames: Vec<ResolvedFrame>,
    pub timeline: CaptureTimeline,
    pub start_ms: TimestampMs,
    pub end_ms: TimestampMs,
    /// When the first navigation painted; samples before it are trimmed.
    pub first_content_ms: Option<TimestampMs>,
}

impl RecordedSession {
    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
