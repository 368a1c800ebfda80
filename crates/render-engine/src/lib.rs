//! democast render engine
//!
//! Turns resolved capture frames into the final output file: effects are
//! composited frame by frame, then the sequence is encoded.
//!
//! # Pipeline
//!
//! ```text
//! ResolvedFrame[] ──▶ speed ramp ──▶ frame contexts
//!                                        │
//!                         ┌──────────────┘
//!                         ▼
//!                 Compositor::compose_frame (per frame)
//!                   device frame, cursor, HUD, zoom,
//!                   background, watermark, resize
//!                         │
//!                         ▼
//!                  step crossfades
//!                         │
//!                         ▼
//!          encode: GIF │ ffmpeg (MP4/WebM) │ PNG sequence
//! ```
//!
//! All pixel work goes through [`RasterProvider`]; [`ImageRaster`] is the
//! `image`/`imageproc` implementation.

pub mod color;
pub mod compositor;
pub mod effects;
pub mod encode;
pub mod raster;

pub use compositor::{needs_text, Compositor, ProgressCallback, RenderProgress, RenderStage};
pub use encode::{encode, encode_with, probe_encoder, run_encoder, EncodeOptions, EncoderRun};
pub use raster::{Fill, ImageRaster, Layer, PixelRect, RasterProvider, Shape};
