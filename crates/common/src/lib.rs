//! democast common utilities
//!
//! Shared infrastructure for all democast crates:
//! - Error taxonomy and result alias
//! - Recording clock (monotonic milliseconds since capture start)
//! - Tracing/logging initialization
//! - Application configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
