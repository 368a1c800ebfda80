//! Raster operations behind the compositor.
//!
//! Effects never touch pixels directly: they describe [`Layer`]s and the
//! [`RasterProvider`] draws them. Shapes are anti-aliased by evaluating a
//! signed distance at each pixel centre; everything blends source-over in
//! straight alpha.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use ab_glyph::{point, Font, FontArc, FontVec, GlyphId, PxScale, ScaleFont};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::{draw_polygon_mut, Blend};

use democast_common::error::{DemocastError, DemocastResult};
use democast_model::{Point, RgbaFrame};

use crate::color::{LinearGradient, Rgba8};

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// How a blank canvas is filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgba8),
    Linear(LinearGradient),
}

/// Something drawable at a position.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Filled, optionally rounded rectangle.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        color: Rgba8,
    },
    /// Soft-edged rounded rectangle.
    Shadow {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        blur: f64,
        color: Rgba8,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba8,
    },
    /// Circle outline of the given stroke width.
    Ring {
        center: Point,
        radius: f64,
        width: f64,
        color: Rgba8,
    },
    /// Radial glow: solid to 70% of the radius, then fading out.
    Glow {
        center: Point,
        radius: f64,
        color: Rgba8,
    },
    /// Round-capped line segment.
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba8,
    },
    Polygon {
        points: Vec<Point>,
        color: Rgba8,
    },
    /// Single-line text; `(x, y)` is the top-left of the line box.
    Text {
        x: f64,
        y: f64,
        size: f32,
        text: String,
        color: Rgba8,
    },
    Image {
        frame: RgbaFrame,
        x: i64,
        y: i64,
    },
}

/// A shape with a layer-wide opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub shape: Shape,
    pub opacity: f64,
}

impl Layer {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Pixel operations the compositor needs.
pub trait RasterProvider: Send + Sync {
    /// Decode an encoded image (PNG, JPEG) into RGBA.
    fn decode(&self, bytes: &[u8]) -> DemocastResult<RgbaFrame>;

    fn blank(&self, width: u32, height: u32, fill: &Fill) -> RgbaFrame;

    /// Stretch to exactly `width`×`height`.
    fn resize(&self, frame: &RgbaFrame, width: u32, height: u32) -> RgbaFrame;

    /// Cut out `rect`, clamped to the frame.
    fn crop(&self, frame: &RgbaFrame, rect: PixelRect) -> RgbaFrame;

    /// Draw `layers` in order over `base`.
    fn composite(&self, base: RgbaFrame, layers: &[Layer]) -> RgbaFrame;

    /// Make everything outside a rounded rectangle of the frame's size
    /// transparent.
    fn mask_rounded(&self, frame: RgbaFrame, radius: f64) -> RgbaFrame;

    fn encode_png(&self, frame: &RgbaFrame) -> DemocastResult<Vec<u8>>;

    /// Whether [`Shape::Text`] layers are actually drawn.
    fn supports_text(&self) -> bool;
}

/// [`RasterProvider`] on `image` and `imageproc`, with `ab_glyph` text.
pub struct ImageRaster {
    font: Option<FontArc>,
    warned_no_font: AtomicBool,
}

impl Default for ImageRaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageRaster {
    /// A raster without a font; text layers are skipped.
    pub fn new() -> Self {
        Self {
            font: None,
            warned_no_font: AtomicBool::new(false),
        }
    }

    pub fn with_font(font: FontArc) -> Self {
        Self {
            font: Some(font),
            warned_no_font: AtomicBool::new(false),
        }
    }

    /// Load a TrueType/OpenType font for text layers.
    pub fn from_font_file(path: &Path) -> DemocastResult<Self> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            DemocastError::render(format!("invalid font {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loaded overlay font");
        Ok(Self::with_font(font))
    }

    /// Pick a sans-serif face from the fonts installed on this machine,
    /// falling back to any face at all.
    pub fn from_system_fonts() -> DemocastResult<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            ..fontdb::Query::default()
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|face| face.id))
            .ok_or_else(|| {
                DemocastError::resource("no system font found; set render.font_path")
            })?;
        let font = db
            .with_face_data(id, |data, index| {
                FontVec::try_from_vec_and_index(data.to_vec(), index)
            })
            .ok_or_else(|| DemocastError::resource("system font data unavailable"))?
            .map_err(|e| DemocastError::resource(format!("unusable system font: {e}")))?;
        if let Some(face) = db.face(id) {
            tracing::debug!(family = ?face.families.first().map(|f| &f.0), "Loaded system overlay font");
        }
        Ok(Self::with_font(FontArc::new(font)))
    }

    /// The configured font file when given, otherwise a system font.
    pub fn for_font(path: Option<&Path>) -> DemocastResult<Self> {
        match path {
            Some(path) => Self::from_font_file(path),
            None => Self::from_system_fonts(),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn draw(&self, mut img: RgbaImage, layer: &Layer) -> RgbaImage {
        let opacity = layer.opacity;
        if opacity <= 0.0 {
            return img;
        }
        match &layer.shape {
            Shape::Rect {
                x,
                y,
                width,
                height,
                radius,
                color,
            } => {
                let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
                fill_sdf(&mut img, (*x, *y, x + width, y + height), *color, opacity, |px, py| {
                    coverage(sd_round_rect(px, py, *x, *y, *width, *height, r))
                });
            }
            Shape::Shadow {
                x,
                y,
                width,
                height,
                radius,
                blur,
                color,
            } => {
                let blur = blur.max(1.0);
                let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
                let bounds = (x - blur, y - blur, x + width + blur, y + height + blur);
                fill_sdf(&mut img, bounds, *color, opacity, |px, py| {
                    let d = sd_round_rect(px, py, *x, *y, *width, *height, r);
                    1.0 - smoothstep(-blur, blur, d)
                });
            }
            Shape::Circle {
                center,
                radius,
                color,
            } => {
                let bounds = square_around(*center, *radius + 1.0);
                fill_sdf(&mut img, bounds, *color, opacity, |px, py| {
                    coverage(distance(px, py, *center) - radius)
                });
            }
            Shape::Ring {
                center,
                radius,
                width,
                color,
            } => {
                let bounds = square_around(*center, *radius + width + 1.0);
                fill_sdf(&mut img, bounds, *color, opacity, |px, py| {
                    coverage((distance(px, py, *center) - radius).abs() - width / 2.0)
                });
            }
            Shape::Glow {
                center,
                radius,
                color,
            } => {
                if *radius > 0.0 {
                    let bounds = square_around(*center, *radius);
                    fill_sdf(&mut img, bounds, *color, opacity, |px, py| {
                        let t = distance(px, py, *center) / radius;
                        if t <= 0.7 {
                            1.0
                        } else {
                            (1.0 - (t - 0.7) / 0.3).clamp(0.0, 1.0)
                        }
                    });
                }
            }
            Shape::Line {
                from,
                to,
                width,
                color,
            } => {
                let pad = width / 2.0 + 1.0;
                let bounds = (
                    from.x.min(to.x) - pad,
                    from.y.min(to.y) - pad,
                    from.x.max(to.x) + pad,
                    from.y.max(to.y) + pad,
                );
                fill_sdf(&mut img, bounds, *color, opacity, |px, py| {
                    coverage(segment_distance(px, py, *from, *to) - width / 2.0)
                });
            }
            Shape::Polygon { points, color } => {
                img = draw_polygon(img, points, *color, opacity);
            }
            Shape::Text {
                x,
                y,
                size,
                text,
                color,
            } => match &self.font {
                Some(font) => draw_text(&mut img, font, *x, *y, *size, text, *color, opacity),
                None => {
                    if !self.warned_no_font.swap(true, Ordering::Relaxed) {
                        tracing::warn!("Raster has no font; text layers are skipped");
                    }
                }
            },
            Shape::Image { frame, x, y } => {
                overlay(&mut img, frame, *x, *y, opacity);
            }
        }
        img
    }
}

impl RasterProvider for ImageRaster {
    fn decode(&self, bytes: &[u8]) -> DemocastResult<RgbaFrame> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| DemocastError::render(format!("failed to decode frame: {e}")))?;
        Ok(from_image(decoded.to_rgba8()))
    }

    fn blank(&self, width: u32, height: u32, fill: &Fill) -> RgbaFrame {
        let (w, h) = (width.max(1), height.max(1));
        match fill {
            Fill::Solid(color) => RgbaFrame::filled(w, h, *color),
            Fill::Linear(gradient) => {
                let img = RgbaImage::from_fn(w, h, |x, y| {
                    let t = gradient.position(
                        x as f64 + 0.5,
                        y as f64 + 0.5,
                        w as f64,
                        h as f64,
                    );
                    Rgba(gradient.sample(t))
                });
                from_image(img)
            }
        }
    }

    fn resize(&self, frame: &RgbaFrame, width: u32, height: u32) -> RgbaFrame {
        let (w, h) = (width.max(1), height.max(1));
        if frame.width == w && frame.height == h {
            return frame.clone();
        }
        let img = to_image(frame.clone());
        from_image(imageops::resize(&img, w, h, FilterType::Triangle))
    }

    fn crop(&self, frame: &RgbaFrame, rect: PixelRect) -> RgbaFrame {
        let x = rect.x.min(frame.width.saturating_sub(1));
        let y = rect.y.min(frame.height.saturating_sub(1));
        let w = rect.width.min(frame.width - x).max(1);
        let h = rect.height.min(frame.height - y).max(1);
        let img = to_image(frame.clone());
        from_image(imageops::crop_imm(&img, x, y, w, h).to_image())
    }

    fn composite(&self, base: RgbaFrame, layers: &[Layer]) -> RgbaFrame {
        if layers.is_empty() {
            return base;
        }
        let mut img = to_image(base);
        for layer in layers {
            img = self.draw(img, layer);
        }
        from_image(img)
    }

    fn mask_rounded(&self, frame: RgbaFrame, radius: f64) -> RgbaFrame {
        let (w, h) = (frame.width as f64, frame.height as f64);
        let r = radius.min(w / 2.0).min(h / 2.0);
        if r <= 0.0 {
            return frame;
        }
        let mut img = to_image(frame);
        let corner = r.ceil() as u32;
        for (x, y, px) in img.enumerate_pixels_mut() {
            let in_corner_x = x < corner || x + corner >= w as u32;
            let in_corner_y = y < corner || y + corner >= h as u32;
            if !(in_corner_x && in_corner_y) {
                continue;
            }
            let c = coverage(sd_round_rect(
                x as f64 + 0.5,
                y as f64 + 0.5,
                0.0,
                0.0,
                w,
                h,
                r,
            ));
            px[3] = (px[3] as f64 * c).round() as u8;
        }
        from_image(img)
    }

    fn encode_png(&self, frame: &RgbaFrame) -> DemocastResult<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, PngFilter::Adaptive)
            .write_image(&frame.data, frame.width, frame.height, ExtendedColorType::Rgba8)
            .map_err(|e| DemocastError::encoding(format!("failed to encode PNG: {e}")))?;
        Ok(bytes)
    }

    fn supports_text(&self) -> bool {
        self.has_font()
    }
}

pub(crate) fn to_image(frame: RgbaFrame) -> RgbaImage {
    let (w, h) = (frame.width, frame.height);
    RgbaImage::from_raw(w, h, frame.data).unwrap_or_else(|| {
        tracing::warn!(width = w, height = h, "Frame buffer size mismatch; using a blank frame");
        RgbaImage::new(w, h)
    })
}

pub(crate) fn from_image(img: RgbaImage) -> RgbaFrame {
    let (width, height) = img.dimensions();
    RgbaFrame {
        width,
        height,
        data: img.into_raw(),
    }
}

/// Source-over blend of `color` at `coverage` onto `dst`, straight alpha.
fn blend_over(dst: &mut Rgba<u8>, color: Rgba8, coverage: f64) {
    let sa = color[3] as f64 / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (color[i] as f64 * sa + dst[i] as f64 * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

fn fill_sdf(
    img: &mut RgbaImage,
    (x0, y0, x1, y1): (f64, f64, f64, f64),
    color: Rgba8,
    opacity: f64,
    cover: impl Fn(f64, f64) -> f64,
) {
    let (w, h) = img.dimensions();
    let xs = x0.floor().max(0.0) as u32;
    let ys = y0.floor().max(0.0) as u32;
    let xe = (x1.ceil().max(0.0) as u32).min(w);
    let ye = (y1.ceil().max(0.0) as u32).min(h);
    for y in ys..ye {
        for x in xs..xe {
            let c = cover(x as f64 + 0.5, y as f64 + 0.5);
            if c > 0.0 {
                blend_over(img.get_pixel_mut(x, y), color, c * opacity);
            }
        }
    }
}

fn coverage(signed_distance: f64) -> f64 {
    (0.5 - signed_distance).clamp(0.0, 1.0)
}

fn smoothstep(e0: f64, e1: f64, x: f64) -> f64 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn distance(px: f64, py: f64, c: Point) -> f64 {
    ((px - c.x).powi(2) + (py - c.y).powi(2)).sqrt()
}

fn square_around(c: Point, r: f64) -> (f64, f64, f64, f64) {
    (c.x - r, c.y - r, c.x + r, c.y + r)
}

fn sd_round_rect(px: f64, py: f64, x: f64, y: f64, w: f64, h: f64, r: f64) -> f64 {
    let (hw, hh) = (w / 2.0, h / 2.0);
    let qx = (px - (x + hw)).abs() - (hw - r);
    let qy = (py - (y + hh)).abs() - (hh - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - r
}

fn segment_distance(px: f64, py: f64, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    distance(px, py, Point::new(a.x + dx * t, a.y + dy * t))
}

fn draw_polygon(img: RgbaImage, points: &[Point], color: Rgba8, opacity: f64) -> RgbaImage {
    let mut poly: Vec<imageproc::point::Point<i32>> = points
        .iter()
        .map(|p| imageproc::point::Point::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    poly.dedup();
    if poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() < 3 {
        return img;
    }
    let alpha = (color[3] as f64 * opacity).round() as u8;
    let mut canvas = Blend(img);
    draw_polygon_mut(&mut canvas, &poly, Rgba([color[0], color[1], color[2], alpha]));
    canvas.0
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    img: &mut RgbaImage,
    font: &FontArc,
    x: f64,
    y: f64,
    size: f32,
    text: &str,
    color: Rgba8,
    opacity: f64,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let baseline = y as f32 + scaled.ascent();
    let (w, h) = img.dimensions();

    let mut caret = x as f32;
    let mut previous: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, c| {
            let px = bounds.min.x as i64 + gx as i64;
            let py = bounds.min.y as i64 + gy as i64;
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                blend_over(img.get_pixel_mut(px as u32, py as u32), color, c as f64 * opacity);
            }
        });
    }
}

fn overlay(img: &mut RgbaImage, frame: &RgbaFrame, x: i64, y: i64, opacity: f64) {
    let (w, h) = img.dimensions();
    for sy in 0..frame.height {
        let dy = y + sy as i64;
        if dy < 0 || dy >= h as i64 {
            continue;
        }
        for sx in 0..frame.width {
            let dx = x + sx as i64;
            if dx < 0 || dx >= w as i64 {
                continue;
            }
            let i = (sy as usize * frame.width as usize + sx as usize) * 4;
            let src = [
                frame.data[i],
                frame.data[i + 1],
                frame.data[i + 2],
                frame.data[i + 3],
            ];
            blend_over(img.get_pixel_mut(dx as u32, dy as u32), src, opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{TRANSPARENT, WHITE};

    const RED: Rgba8 = [255, 0, 0, 255];

    fn px(frame: &RgbaFrame, x: u32, y: u32) -> Rgba8 {
        frame.pixel(x, y).unwrap()
    }

    #[test]
    fn test_rect_fills_inside_only() {
        let raster = ImageRaster::new();
        let base = raster.blank(10, 10, &Fill::Solid(WHITE));
        let out = raster.composite(
            base,
            &[Layer::new(Shape::Rect {
                x: 2.0,
                y: 2.0,
                width: 4.0,
                height: 4.0,
                radius: 0.0,
                color: RED,
            })],
        );
        assert_eq!(px(&out, 3, 3), RED);
        assert_eq!(px(&out, 7, 7), WHITE);
    }

    #[test]
    fn test_layer_opacity_blends() {
        let raster = ImageRaster::new();
        let base = raster.blank(4, 4, &Fill::Solid([0, 0, 0, 255]));
        let out = raster.composite(
            base,
            &[Layer::new(Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: 4.0,
                height: 4.0,
                radius: 0.0,
                color: WHITE,
            })
            .with_opacity(0.5)],
        );
        assert_eq!(px(&out, 1, 1), [128, 128, 128, 255]);
    }

    #[test]
    fn test_mask_rounded_clears_corners() {
        let raster = ImageRaster::new();
        let frame = raster.blank(40, 40, &Fill::Solid(RED));
        let masked = raster.mask_rounded(frame, 12.0);
        assert_eq!(px(&masked, 0, 0)[3], 0);
        assert_eq!(px(&masked, 39, 39)[3], 0);
        assert_eq!(px(&masked, 20, 20), RED);
        assert_eq!(px(&masked, 20, 0), RED);
    }

    #[test]
    fn test_crop_and_resize_dimensions() {
        let raster = ImageRaster::new();
        let frame = raster.blank(100, 50, &Fill::Solid(RED));
        let cropped = raster.crop(&frame, PixelRect::new(90, 40, 50, 50));
        assert_eq!((cropped.width, cropped.height), (10, 10));
        let resized = raster.resize(&cropped, 33, 17);
        assert_eq!((resized.width, resized.height), (33, 17));
        assert_eq!(px(&resized, 16, 8), RED);
    }

    #[test]
    fn test_png_round_trip_through_decode() {
        let raster = ImageRaster::new();
        let frame = raster.blank(6, 3, &Fill::Solid([1, 2, 3, 255]));
        let png = raster.encode_png(&frame).unwrap();
        assert_eq!(raster.decode(&png).unwrap(), frame);
        assert!(raster.decode(b"not an image").is_err());
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let raster = ImageRaster::new();
        assert!(!raster.supports_text());
        let base = raster.blank(20, 20, &Fill::Solid(TRANSPARENT));
        let out = raster.composite(
            base.clone(),
            &[Layer::new(Shape::Text {
                x: 0.0,
                y: 0.0,
                size: 12.0,
                text: "hi".into(),
                color: WHITE,
            })],
        );
        assert_eq!(out, base);
    }

    #[test]
    fn test_system_font_draws_text() {
        let raster = ImageRaster::from_system_fonts().unwrap();
        assert!(raster.supports_text());
        let base = raster.blank(60, 30, &Fill::Solid(TRANSPARENT));
        let out = raster.composite(
            base.clone(),
            &[Layer::new(Shape::Text {
                x: 2.0,
                y: 2.0,
                size: 20.0,
                text: "Hi".into(),
                color: WHITE,
            })],
        );
        assert_ne!(out, base);
    }

    #[test]
    fn test_image_layer_respects_offsets_and_alpha() {
        let raster = ImageRaster::new();
        let base = raster.blank(6, 6, &Fill::Solid(WHITE));
        let mut stamp = RgbaFrame::filled(2, 2, RED);
        stamp.data[3] = 0; // top-left pixel fully transparent
        let out = raster.composite(
            base,
            &[Layer::new(Shape::Image {
                frame: stamp,
                x: 0,
                y: 4,
            })],
        );
        assert_eq!(px(&out, 0, 4), WHITE);
        assert_eq!(px(&out, 1, 4), RED);
        assert_eq!(px(&out, 0, 5), RED);
        assert_eq!(px(&out, 2, 4), WHITE);
    }

    #[test]
    fn test_gradient_blank_runs_left_to_right() {
        let raster = ImageRaster::new();
        let g = LinearGradient::parse("linear-gradient(90deg, #000000 0%, #ffffff 100%)").unwrap();
        let frame = raster.blank(64, 4, &Fill::Linear(g));
        assert!(px(&frame, 0, 1)[0] < 10);
        assert!(px(&frame, 63, 1)[0] > 245);
    }

    #[test]
    fn test_ring_is_hollow() {
        let raster = ImageRaster::new();
        let base = raster.blank(40, 40, &Fill::Solid(TRANSPARENT));
        let out = raster.composite(
            base,
            &[Layer::new(Shape::Ring {
                center: Point::new(20.0, 20.0),
                radius: 10.0,
                width: 2.0,
                color: RED,
            })],
        );
        assert_eq!(px(&out, 20, 20)[3], 0);
        assert!(px(&out, 30, 20)[3] > 0);
    }
}
