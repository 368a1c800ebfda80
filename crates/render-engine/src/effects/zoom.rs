//! Zoom by cropping around a focus point and scaling back up.

use democast_model::{Point, RgbaFrame};

use crate::raster::{PixelRect, RasterProvider};

/// The `width/scale × height/scale` window centred on `focus`, shifted to
/// stay inside the frame.
pub fn zoom_crop_rect(focus: Point, scale: f64, width: u32, height: u32) -> PixelRect {
    let crop_w = ((width as f64 / scale).round() as u32).clamp(1, width.max(1));
    let crop_h = ((height as f64 / scale).round() as u32).clamp(1, height.max(1));
    let left = (focus.x - crop_w as f64 / 2.0)
        .round()
        .clamp(0.0, (width - crop_w) as f64);
    let top = (focus.y - crop_h as f64 / 2.0)
        .round()
        .clamp(0.0, (height - crop_h) as f64);
    PixelRect::new(left as u32, top as u32, crop_w, crop_h)
}

/// Crop around `focus` and resize back to the frame's own size. A scale at
/// or below 1 leaves the frame untouched.
pub fn apply_zoom<R: RasterProvider + ?Sized>(
    raster: &R,
    frame: RgbaFrame,
    scale: f64,
    focus: Point,
) -> RgbaFrame {
    if scale <= 1.0 || frame.width == 0 || frame.height == 0 {
        return frame;
    }
    let rect = zoom_crop_rect(focus, scale, frame.width, frame.height);
    let cropped = raster.crop(&frame, rect);
    raster.resize(&cropped, frame.width, frame.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ImageRaster;

    #[test]
    fn test_crop_centred_on_focus() {
        let rect = zoom_crop_rect(Point::new(640.0, 400.0), 2.0, 1280, 800);
        assert_eq!(rect, PixelRect::new(320, 200, 640, 400));
    }

    #[test]
    fn test_crop_clamped_at_edges() {
        let rect = zoom_crop_rect(Point::new(0.0, 800.0), 2.0, 1280, 800);
        assert_eq!(rect, PixelRect::new(0, 400, 640, 400));
        let rect = zoom_crop_rect(Point::new(5000.0, -20.0), 1.8, 1280, 800);
        assert_eq!(rect.x + rect.width, 1280);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_unit_scale_is_identity() {
        let raster = ImageRaster::new();
        let frame = RgbaFrame::filled(10, 10, [9, 9, 9, 255]);
        let out = apply_zoom(&raster, frame.clone(), 1.0, Point::new(5.0, 5.0));
        assert_eq!(out, frame);
    }

    #[test]
    fn test_zoom_keeps_dimensions() {
        let raster = ImageRaster::new();
        let frame = RgbaFrame::filled(64, 48, [9, 9, 9, 255]);
        let out = apply_zoom(&raster, frame, 1.7, Point::new(60.0, 2.0));
        assert_eq!((out.width, out.height), (64, 48));
    }
}
