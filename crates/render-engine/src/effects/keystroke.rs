//! On-screen keystroke display.

use democast_model::{HudPosition, KeystrokeConfig, KeystrokeEvent};

use crate::color::{color_or, WHITE};
use crate::raster::{Layer, Shape};

/// Average glyph advance as a fraction of the font size.
pub const CHAR_WIDTH_RATIO: f64 = 0.62;

const EDGE_MARGIN: f64 = 30.0;
/// Horizontal room always left free beside the HUD.
const MIN_SIDE_ROOM: f64 = 40.0;
const CORNER_RADIUS: f64 = 8.0;
/// Share of `fade_after` during which keys stay fully opaque.
const FADE_START: f64 = 0.6;

/// Where and how the HUD is drawn for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HudLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub text_x: f64,
    pub text_y: f64,
    pub opacity: f64,
}

/// Lay out the HUD for keys typed before `now`. Returns `None` when no
/// key is recent enough to show.
pub fn layout_hud(
    config: &KeystrokeConfig,
    keys: &[KeystrokeEvent],
    now: f64,
    width: u32,
    height: u32,
) -> Option<HudLayout> {
    let fade_after = config.fade_after as f64;
    let visible: Vec<&KeystrokeEvent> = keys
        .iter()
        .filter(|k| now - k.timestamp < fade_after)
        .collect();
    let newest = visible.last()?;

    let font_size = config.font_size as f64;
    let char_width = font_size * CHAR_WIDTH_RATIO;
    let pad_h = config.padding as f64 * 2.0;
    let pad_v = config.padding as f64 * 1.5;

    let full: String = visible.iter().map(|k| display_key(&k.key)).collect();
    let count = full.chars().count();
    let text_width = (count as f64 * char_width).ceil();
    let room = width as f64 - MIN_SIDE_ROOM;
    let hud_width = (text_width + pad_h * 2.0).min(room);
    let hud_height = (font_size + pad_v * 2.0).ceil();
    if hud_width <= pad_h * 2.0 {
        return None;
    }

    // Whole text when it fits; otherwise as many trailing characters as
    // the clamped box holds.
    let max_chars = if text_width + pad_h * 2.0 <= room {
        count
    } else {
        ((hud_width - pad_h * 2.0) / char_width).floor().max(0.0) as usize
    };
    let text: String = full.chars().skip(count.saturating_sub(max_chars)).collect();

    let age = now - newest.timestamp;
    let fade_start = fade_after * FADE_START;
    let opacity = if age > fade_start && fade_after > fade_start {
        (1.0 - (age - fade_start) / (fade_after - fade_start)).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let y = height as f64 - hud_height - EDGE_MARGIN;
    let x = match config.position {
        HudPosition::BottomLeft => EDGE_MARGIN,
        HudPosition::BottomRight => width as f64 - hud_width - EDGE_MARGIN,
        HudPosition::BottomCenter => (width as f64 - hud_width) / 2.0,
    };

    Some(HudLayout {
        x,
        y,
        width: hud_width,
        height: hud_height,
        text,
        text_x: x + pad_h,
        text_y: y + pad_v,
        opacity,
    })
}

/// Render named keys as symbols; printable keys pass through.
fn display_key(key: &str) -> String {
    match key {
        "Enter" => "⏎".to_string(),
        "Backspace" => "⌫".to_string(),
        "Tab" => "⇥".to_string(),
        "Escape" => "⎋".to_string(),
        " " => "␣".to_string(),
        other => other.to_string(),
    }
}

pub fn hud_layers(config: &KeystrokeConfig, hud: HudLayout) -> Vec<Layer> {
    let background = color_or(&config.background_color, [0, 0, 0, 191]);
    let text_color = color_or(&config.text_color, WHITE);
    vec![
        Layer::new(Shape::Rect {
            x: hud.x,
            y: hud.y,
            width: hud.width,
            height: hud.height,
            radius: CORNER_RADIUS,
            color: background,
        })
        .with_opacity(hud.opacity),
        Layer::new(Shape::Text {
            x: hud.text_x,
            y: hud.text_y,
            size: config.font_size as f32,
            text: hud.text,
            color: text_color,
        })
        .with_opacity(hud.opacity),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(text: &str, start: f64, gap: f64) -> Vec<KeystrokeEvent> {
        text.chars()
            .enumerate()
            .map(|(i, c)| KeystrokeEvent {
                key: c.to_string(),
                timestamp: start + i as f64 * gap,
            })
            .collect()
    }

    fn config() -> KeystrokeConfig {
        KeystrokeConfig {
            enabled: true,
            ..KeystrokeConfig::default()
        }
    }

    #[test]
    fn test_no_recent_keys_no_hud() {
        let cfg = config();
        assert!(layout_hud(&cfg, &[], 100.0, 1280, 800).is_none());
        let old = keys("abc", 0.0, 10.0);
        assert!(layout_hud(&cfg, &old, 5000.0, 1280, 800).is_none());
    }

    #[test]
    fn test_centered_at_bottom() {
        let cfg = config();
        let hud = layout_hud(&cfg, &keys("hello", 0.0, 50.0), 300.0, 1280, 800).unwrap();
        assert_eq!(hud.text, "hello");
        assert_eq!(hud.opacity, 1.0);
        assert!(((hud.x + hud.width / 2.0) - 640.0).abs() < 1e-9);
        assert_eq!(hud.y, 800.0 - hud.height - 30.0);
        // fontSize 18, padding 8: 18 + 2 * 12
        assert_eq!(hud.height, 42.0);
    }

    #[test]
    fn test_corner_positions() {
        let mut cfg = config();
        cfg.position = HudPosition::BottomLeft;
        let left = layout_hud(&cfg, &keys("a", 0.0, 0.0), 10.0, 1280, 800).unwrap();
        assert_eq!(left.x, 30.0);
        cfg.position = HudPosition::BottomRight;
        let right = layout_hud(&cfg, &keys("a", 0.0, 0.0), 10.0, 1280, 800).unwrap();
        assert!((right.x + right.width - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn test_fades_out_near_expiry() {
        let cfg = config();
        let k = keys("x", 0.0, 0.0);
        let early = layout_hud(&cfg, &k, 800.0, 1280, 800).unwrap();
        let late = layout_hud(&cfg, &k, 1400.0, 1280, 800).unwrap();
        assert_eq!(early.opacity, 1.0);
        assert!(late.opacity > 0.0 && late.opacity < 0.5);
    }

    #[test]
    fn test_long_text_keeps_most_recent_characters() {
        let cfg = config();
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(4);
        let hud = layout_hud(&cfg, &keys(&text, 0.0, 1.0), 200.0, 300, 200).unwrap();
        assert!(hud.width <= 300.0 - 40.0);
        assert!(hud.text.len() < text.len());
        assert!(text.ends_with(&hud.text));
    }

    #[test]
    fn test_named_keys_use_symbols() {
        let cfg = config();
        let k = vec![KeystrokeEvent {
            key: "Enter".into(),
            timestamp: 0.0,
        }];
        assert_eq!(layout_hud(&cfg, &k, 10.0, 1280, 800).unwrap().text, "⏎");
    }

    #[test]
    fn test_short_text_is_shown_whole() {
        let cfg = config();
        let one = layout_hud(&cfg, &keys("a", 0.0, 0.0), 20.0, 1280, 800).unwrap();
        assert_eq!(one.text, "a");

        let phrase = layout_hud(&cfg, &keys("hello world", 0.0, 1.0), 20.0, 1280, 800).unwrap();
        assert_eq!(phrase.text, "hello␣world");
    }

    #[test]
    fn test_text_fits_inside_box() {
        let cfg = config();
        for text in ["a", "ab", "hello", "hello world", "0123456789abcdef"] {
            let hud = layout_hud(&cfg, &keys(text, 0.0, 1.0), 20.0, 1280, 800).unwrap();
            let pad_h = cfg.padding as f64 * 2.0;
            let char_width = cfg.font_size as f64 * CHAR_WIDTH_RATIO;
            assert_eq!(hud.text.chars().count(), text.chars().count());
            assert!(hud.text.chars().count() as f64 * char_width <= hud.width - pad_h * 2.0);
        }
    }
}
