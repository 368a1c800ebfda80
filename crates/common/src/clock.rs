//! Recording clock.
//!
//! Every timestamp in a capture (sample arrival, cursor keyframe, click,
//! keystroke, step marker) is milliseconds since the same monotonic epoch,
//! taken when the recording session starts. Ordering between samples and
//! events is established purely by comparing these values.
//!
//! The clock reads `tokio::time::Instant`, so tests running under a paused
//! runtime observe virtual time deterministically.

use tokio::time::Instant;

/// A recording clock that yields monotonic millisecond timestamps relative
/// to a fixed epoch.
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since the epoch, with sub-millisecond precision.
    pub fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Convert a millisecond duration to a `std::time::Duration`,
    /// saturating negatives to zero.
    pub fn ms_to_duration(ms: f64) -> std::time::Duration {
        std::time::Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }
}
