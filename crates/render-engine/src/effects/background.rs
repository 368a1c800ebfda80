//! Padded background canvas with a rounded, shadowed content card.

use std::path::Path;

use democast_model::{BackgroundConfig, BackgroundKind, RgbaFrame};

use crate::color::{color_or, LinearGradient, Rgba8};
use crate::raster::{Fill, Layer, RasterProvider, Shape};

const SHADOW_OFFSET_Y: f64 = 4.0;
const SHADOW_BLUR: f64 = 16.0;
const SHADOW_COLOR: Rgba8 = [0, 0, 0, 77];
const FALLBACK_GRADIENT: &str = "linear-gradient(135deg, #667eea 0%, #764ba2 100%)";

/// Fill for the configured background kind. Image backgrounds are resolved
/// separately by [`background_canvas`].
pub fn background_fill(config: &BackgroundConfig) -> Fill {
    match config.kind {
        BackgroundKind::Solid => Fill::Solid(color_or(&config.value, [17, 17, 17, 255])),
        BackgroundKind::Gradient | BackgroundKind::Image => {
            let value = match config.kind {
                BackgroundKind::Image => FALLBACK_GRADIENT,
                _ => config.value.as_str(),
            };
            match LinearGradient::parse(value) {
                Some(gradient) => Fill::Linear(gradient),
                None => {
                    tracing::warn!(value, "Unrecognized background gradient; using default");
                    default_gradient()
                }
            }
        }
    }
}

fn default_gradient() -> Fill {
    LinearGradient::parse(FALLBACK_GRADIENT)
        .map(Fill::Linear)
        .unwrap_or(Fill::Solid([102, 126, 234, 255]))
}

/// The empty `width`×`height` canvas the content card is placed on.
pub fn background_canvas<R: RasterProvider + ?Sized>(
    raster: &R,
    config: &BackgroundConfig,
    width: u32,
    height: u32,
) -> RgbaFrame {
    if config.kind == BackgroundKind::Image {
        match load_image(raster, Path::new(&config.value)) {
            Ok(image) => return raster.resize(&image, width, height),
            Err(err) => {
                tracing::warn!(path = %config.value, error = %err, "Background image unavailable; using gradient");
            }
        }
    }
    raster.blank(width, height, &background_fill(config))
}

fn load_image<R: RasterProvider + ?Sized>(
    raster: &R,
    path: &Path,
) -> democast_common::error::DemocastResult<RgbaFrame> {
    let bytes = std::fs::read(path)?;
    raster.decode(&bytes)
}

/// Shrink `frame` into the padded content area of `canvas`, round its
/// corners, and drop it onto the canvas with an optional shadow. When the
/// padding leaves no room the frame is returned as is.
pub fn apply_background<R: RasterProvider + ?Sized>(
    raster: &R,
    frame: RgbaFrame,
    config: &BackgroundConfig,
    canvas: &RgbaFrame,
) -> RgbaFrame {
    let padding = config.padding as i64;
    let content_w = canvas.width as i64 - padding * 2;
    let content_h = canvas.height as i64 - padding * 2;
    if content_w <= 0 || content_h <= 0 {
        return frame;
    }
    let (content_w, content_h) = (content_w as u32, content_h as u32);

    let content = raster.resize(&frame, content_w, content_h);
    let content = raster.mask_rounded(content, config.border_radius as f64);

    let mut layers = Vec::with_capacity(2);
    if config.shadow {
        layers.push(Layer::new(Shape::Shadow {
            x: padding as f64,
            y: padding as f64 + SHADOW_OFFSET_Y,
            width: content_w as f64,
            height: content_h as f64,
            radius: config.border_radius as f64,
            blur: SHADOW_BLUR,
            color: SHADOW_COLOR,
        }));
    }
    layers.push(Layer::new(Shape::Image {
        frame: content,
        x: padding,
        y: padding,
    }));
    raster.composite(canvas.clone(), &layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ImageRaster;

    fn solid(padding: u32) -> BackgroundConfig {
        BackgroundConfig {
            kind: BackgroundKind::Solid,
            value: "#00ff00".into(),
            padding,
            border_radius: 0,
            shadow: false,
        }
    }

    #[test]
    fn test_content_inset_by_padding() {
        let raster = ImageRaster::new();
        let cfg = solid(10);
        let canvas = background_canvas(&raster, &cfg, 100, 80);
        let frame = RgbaFrame::filled(200, 160, [255, 0, 0, 255]);
        let out = apply_background(&raster, frame, &cfg, &canvas);

        assert_eq!((out.width, out.height), (100, 80));
        assert_eq!(out.pixel(5, 5), Some([0, 255, 0, 255]));
        assert_eq!(out.pixel(50, 40), Some([255, 0, 0, 255]));
        assert_eq!(out.pixel(95, 75), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_oversized_padding_passes_through() {
        let raster = ImageRaster::new();
        let cfg = solid(60);
        let canvas = background_canvas(&raster, &cfg, 100, 100);
        let frame = RgbaFrame::filled(30, 30, [1, 2, 3, 255]);
        assert_eq!(apply_background(&raster, frame.clone(), &cfg, &canvas), frame);
    }

    #[test]
    fn test_missing_image_falls_back_to_gradient() {
        let raster = ImageRaster::new();
        let cfg = BackgroundConfig {
            kind: BackgroundKind::Image,
            value: "/definitely/not/here.png".into(),
            ..BackgroundConfig::default()
        };
        let canvas = background_canvas(&raster, &cfg, 40, 40);
        assert_eq!((canvas.width, canvas.height), (40, 40));
        assert_eq!(canvas.pixel(0, 0).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_bad_gradient_uses_default() {
        let cfg = BackgroundConfig {
            value: "linear-gradient(nope)".into(),
            ..BackgroundConfig::default()
        };
        assert!(matches!(background_fill(&cfg), Fill::Linear(_)));
    }
}
