//! Cursor overlays: highlight glow, motion trail, arrow marker, click ripple.
//!
//! All positions arrive in content space and are shifted by the device
//! inset so the overlays land on the captured page, not the bezel.

use democast_model::{CursorConfig, Point};

use crate::color::{color_or, Rgba8, WHITE};
use crate::effects::device_frame::DeviceInset;
use crate::raster::{Layer, Shape};

/// Arrow outline in a 24-unit box, tip at the origin.
const ARROW: [(f64, f64); 7] = [
    (4.0, 0.0),
    (4.0, 22.0),
    (10.0, 16.0),
    (16.0, 24.0),
    (20.0, 22.0),
    (14.0, 14.0),
    (22.0, 14.0),
];
const ARROW_BOX: f64 = 24.0;
const ARROW_STROKE: f64 = 1.5;

const RIPPLE_STROKE: f64 = 2.0;
const TRAIL_MAX_OPACITY: f64 = 0.6;

pub fn highlight(config: &CursorConfig, cursor: Point, inset: DeviceInset) -> Option<Layer> {
    if !config.highlight {
        return None;
    }
    Some(Layer::new(Shape::Glow {
        center: inset.offset(cursor),
        radius: config.highlight_radius as f64,
        color: color_or(&config.highlight_color, [255, 215, 0, 46]),
    }))
}

/// Segments fading in from the oldest point; newer segments are thicker.
pub fn trail(config: &CursorConfig, points: &[Point], inset: DeviceInset) -> Vec<Layer> {
    if !config.trail || points.len() < 2 {
        return Vec::new();
    }
    let color = color_or(&config.trail_color, [59, 130, 246, 51]);
    let n = (points.len() - 1) as f64;
    points
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let weight = (i + 1) as f64 / n;
            Layer::new(Shape::Line {
                from: inset.offset(pair[0]),
                to: inset.offset(pair[1]),
                width: 1.0 + weight * 2.0,
                color,
            })
            .with_opacity(weight * TRAIL_MAX_OPACITY)
        })
        .collect()
}

/// Arrow with its tip at the cursor, clamped inside `bounds`.
pub fn marker(
    config: &CursorConfig,
    cursor: Point,
    inset: DeviceInset,
    bounds: (u32, u32),
) -> Vec<Layer> {
    let scale = config.size as f64 / ARROW_BOX;
    let at = inset.offset(cursor);
    let x = at.x.round().clamp(0.0, bounds.0.saturating_sub(1) as f64);
    let y = at.y.round().clamp(0.0, bounds.1.saturating_sub(1) as f64);
    let fill = color_or(&config.color, [0, 0, 0, 255]);

    let outline = arrow_points(x, y, scale, ARROW_STROKE * scale);
    let body = arrow_points(x, y, scale, 0.0);
    vec![
        Layer::new(Shape::Polygon {
            points: outline,
            color: WHITE,
        }),
        Layer::new(Shape::Polygon {
            points: body,
            color: fill,
        }),
    ]
}

/// Arrow vertices, pushed out from the arrow's centroid by `grow`.
fn arrow_points(x: f64, y: f64, scale: f64, grow: f64) -> Vec<Point> {
    let n = ARROW.len() as f64;
    let cx = ARROW.iter().map(|p| p.0).sum::<f64>() / n * scale;
    let cy = ARROW.iter().map(|p| p.1).sum::<f64>() / n * scale;
    ARROW
        .iter()
        .map(|&(px, py)| {
            let (sx, sy) = (px * scale, py * scale);
            let (dx, dy) = (sx - cx, sy - cy);
            let len = dx.hypot(dy).max(f64::EPSILON);
            Point::new(x + sx + dx / len * grow, y + sy + dy / len * grow)
        })
        .collect()
}

/// Expanding ring plus a softer inner disc; both fade out as `progress`
/// approaches 1.
pub fn ripple(
    config: &CursorConfig,
    click: Point,
    progress: f64,
    inset: DeviceInset,
) -> Vec<Layer> {
    if !config.click_effect {
        return Vec::new();
    }
    let p = progress.clamp(0.0, 1.0);
    let radius = config.click_radius as f64 * p;
    if radius <= 0.0 {
        return Vec::new();
    }
    let color: Rgba8 = color_or(&config.click_color, [59, 130, 246, 77]);
    let center = inset.offset(click);
    vec![
        Layer::new(Shape::Ring {
            center,
            radius,
            width: RIPPLE_STROKE,
            color,
        })
        .with_opacity(1.0 - p),
        Layer::new(Shape::Circle {
            center,
            radius: radius * 0.6,
            color,
        })
        .with_opacity(0.4 * (1.0 - p)),
    ]
}
