//! democast data model
//!
//! Defines the data contracts shared by capture, processing, and render:
//! - **Scenario:** the declarative script (steps, actions, effects, output)
//! - **Timeline:** append-only cursor/click/keystroke event sequences plus
//!   step markers, recorded against one clock
//! - **Frames:** raw samples, resolved frames, per-frame render contexts,
//!   and composited pixel buffers
//!
//! ```text
//!   RawSample ──┐
//!               ├─ CaptureTimeline::resolve_at ──▶ ResolvedFrame ──▶ FrameContext
//!   events ─────┘                                                    │
//!                                                   RenderedFrame ◀──┘
//! ```
//!
//! All positions are viewport pixels; all timestamps are milliseconds on
//! the recording clock.

pub mod frame;
pub mod geometry;
pub mod scenario;
pub mod timeline;
pub mod validate;

pub use frame::*;
pub use geometry::*;
pub use scenario::*;
pub use timeline::*;
pub use validate::*;
