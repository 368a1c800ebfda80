//! Democast Capture Engine
//!
//! Runs a scenario against a headless browser and records what happened:
//! a stream of screen samples stamped on arrival, plus a timeline of the
//! synthetic cursor, clicks, keystrokes and step starts, all on one clock.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                     Recorder                     │
//! │  steps ─▶ actions ─▶ AutomationProvider          │
//! │                        │   (simulated | bridge)  │
//! │                        │ samples                 │
//! │                        ▼                         │
//! │          sample channel (1 slot, acked)          │
//! │                        │                         │
//! │                        ▼                         │
//! │   collector ─▶ RawSample { image, arrival_ms }   │
//! │                                                  │
//! │   CaptureTimeline ◀── cursor / click / key / step│
//! └────────────────────────┬─────────────────────────┘
//!                          ▼
//!         trim ─▶ resolve ─▶ resample ─▶ RecordedSession
//! ```

pub mod bridge;
pub mod channel;
pub mod provider;
pub mod recorder;
pub mod simulated;

pub use bridge::BridgeProvider;
pub use channel::{sample_channel, ChannelClosed, Delivery, SampleConsumer, SampleProducer};
pub use provider::AutomationProvider;
pub use recorder::{RecordError, Recorder, RecorderOptions};
pub use simulated::{Journal, SimulatedElement, SimulatedPage, SimulatedProvider, UnknownSelectors};
