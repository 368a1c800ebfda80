//! Per-frame visual effects.
//!
//! Each effect is either a frame transform (device frame, zoom,
//! background) or a producer of [`Layer`](crate::raster::Layer)s drawn
//! over the current frame (cursor, keystroke HUD, watermark).

pub mod background;
pub mod cursor;
pub mod device_frame;
pub mod keystroke;
pub mod watermark;
pub mod zoom;

pub use background::{apply_background, background_canvas};
pub use device_frame::{apply_device_frame, device_inset, DeviceInset};
pub use keystroke::{layout_hud, HudLayout};
pub use watermark::watermark_layer;
pub use zoom::{apply_zoom, zoom_crop_rect};
