//! Corner text watermark.

use democast_model::{Corner, WatermarkConfig};

use crate::color::{color_or, WHITE};
use crate::effects::keystroke::CHAR_WIDTH_RATIO;
use crate::raster::{Layer, Shape};

const MARGIN: f64 = 16.0;

/// Top-left of the watermark's line box on a `width`×`height` frame.
pub fn watermark_origin(config: &WatermarkConfig, width: u32, height: u32) -> (f64, f64) {
    let font_size = config.font_size as f64;
    let text_width = (config.text.chars().count() as f64 * font_size * CHAR_WIDTH_RATIO).ceil();
    let x = match config.position {
        Corner::TopLeft | Corner::BottomLeft => MARGIN,
        Corner::TopRight | Corner::BottomRight => width as f64 - text_width - MARGIN,
    };
    let baseline = match config.position {
        Corner::TopLeft | Corner::TopRight => MARGIN + font_size,
        Corner::BottomLeft | Corner::BottomRight => height as f64 - MARGIN,
    };
    (x, baseline - font_size)
}

pub fn watermark_layer(config: &WatermarkConfig, width: u32, height: u32) -> Option<Layer> {
    if !config.enabled || config.text.is_empty() {
        return None;
    }
    let (x, y) = watermark_origin(config, width, height);
    Some(
        Layer::new(Shape::Text {
            x,
            y,
            size: config.font_size as f32,
            text: config.text.clone(),
            color: color_or(&config.color, WHITE),
        })
        .with_opacity(config.opacity),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(position: Corner) -> WatermarkConfig {
        WatermarkConfig {
            enabled: true,
            text: "democast".into(),
            position,
            ..WatermarkConfig::default()
        }
    }

    #[test]
    fn test_corners() {
        // 8 chars * 14 * 0.62 = 69.44 -> 70
        assert_eq!(watermark_origin(&config(Corner::TopLeft), 400, 300), (16.0, 16.0));
        assert_eq!(
            watermark_origin(&config(Corner::BottomRight), 400, 300),
            (400.0 - 70.0 - 16.0, 300.0 - 16.0 - 14.0)
        );
        assert_eq!(
            watermark_origin(&config(Corner::TopRight), 400, 300).0,
            314.0
        );
    }

    #[test]
    fn test_disabled_or_empty_draws_nothing() {
        let mut cfg = config(Corner::TopLeft);
        cfg.text.clear();
        assert!(watermark_layer(&cfg, 100, 100).is_none());
        let mut cfg = config(Corner::TopLeft);
        cfg.enabled = false;
        assert!(watermark_layer(&cfg, 100, 100).is_none());
    }

    #[test]
    fn test_opacity_carried() {
        let layer = watermark_layer(&config(Corner::BottomLeft), 100, 100).unwrap();
        assert_eq!(layer.opacity, 0.5);
    }
}
