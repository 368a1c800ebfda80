//! Frame records flowing from capture to encode.

use std::sync::Arc;

use crate::geometry::{Point, ViewportSize};
use crate::timeline::{KeystrokeEvent, TimestampMs};

/// An encoded screen image as delivered by the capture channel, stamped
/// with its arrival time on the recording clock.
#[derive(Debug, Clone)]
pub struct RawSample {
    pub image: Arc<[u8]>,
    pub arrival_ms: TimestampMs,
}

/// A captured image plus the overlay state derived for its timestamp.
///
/// Images are shared: a resampled sequence that repeats a raw sample holds
/// another reference to the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrame {
    pub index: usize,
    pub image: Arc<[u8]>,
    pub timestamp: TimestampMs,
    pub cursor_position: Option<Point>,
    pub click_position: Option<Point>,
    /// In `[0, 1]`; present only inside a click's effect window.
    pub click_progress: Option<f64>,
    pub viewport: ViewportSize,
    pub step_index: usize,
    pub keystrokes_active: Vec<KeystrokeEvent>,
}

/// Per-frame render parameters computed by the effects engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    /// Always `>= 1.0`.
    pub zoom_scale: f64,
    pub click_progress: Option<f64>,
    /// Oldest first, ending with the current frame's cursor.
    pub cursor_trail: Vec<Point>,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            zoom_scale: 1.0,
            click_progress: None,
            cursor_trail: Vec::new(),
        }
    }
}

/// Straight (non-premultiplied) RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaFrame {
    /// Wrap a buffer; returns `None` when its length does not match
    /// `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn same_size(&self, other: &RgbaFrame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// A composited output frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub index: usize,
    pub pixels: RgbaFrame,
    pub timestamp: TimestampMs,
}
