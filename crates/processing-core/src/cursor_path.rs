//! Synthetic cursor movement.
//!
//! Scripted clicks teleport in the browser; the recorded cursor instead
//! travels along a gently curved, eased path so the output looks like a
//! human moved the mouse.

use democast_model::{CursorSpeed, Point};

/// Path resolution and pacing for one cursor speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedPreset {
    /// Number of path segments (the path has `steps + 1` points).
    pub steps: usize,
    /// Pause after each intermediate point.
    pub delay_ms: u64,
}

impl SpeedPreset {
    pub fn for_speed(speed: CursorSpeed) -> Self {
        match speed {
            CursorSpeed::Fast => Self {
                steps: 12,
                delay_ms: 6,
            },
            CursorSpeed::Normal => Self {
                steps: 18,
                delay_ms: 8,
            },
            CursorSpeed::Slow => Self {
                steps: 24,
                delay_ms: 12,
            },
        }
    }
}

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// `steps + 1` points from `from` to `to` along a cubic Bézier whose
/// control points bow perpendicular to the direction of travel.
///
/// `steps == 0` yields `[to]`; `steps == 1` yields `[from, to]`.
pub fn interpolate_path(from: Point, to: Point, steps: usize) -> Vec<Point> {
    if steps == 0 {
        return vec![to];
    }
    if steps == 1 {
        return vec![from, to];
    }

    let dx = to.x - from.x;
    let dy = to.y - from.y;
    // perpendicular (dy, -dx)
    let cp1 = Point::new(from.x + dx * 0.25 + dy * 0.1, from.y + dy * 0.25 - dx * 0.1);
    let cp2 = Point::new(from.x + dx * 0.75 - dy * 0.1, from.y + dy * 0.75 + dx * 0.1);

    let mut points = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = ease_in_out_cubic(i as f64 / steps as f64);
        points.push(cubic_bezier(from, cp1, cp2, to, t));
    }
    points
}

fn cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Chaikin corner cutting with cut fraction `0.25 * tension`.
///
/// Endpoints are preserved; inputs with fewer than three points are
/// returned unchanged.
pub fn smooth_path(points: &[Point], tension: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let c = 0.25 * tension.clamp(0.0, 1.0);
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(points[0]);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        out.push(Point::lerp(a, b, c));
        out.push(Point::lerp(a, b, 1.0 - c));
    }
    out.push(points[points.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_easing_fixed_points() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
    }

    #[test]
    fn test_path_degenerate_cases() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(interpolate_path(p, p, 0), vec![p]);

        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 40.0);
        assert_eq!(interpolate_path(a, b, 1), vec![a, b]);
        assert_eq!(interpolate_path(a, b, 0), vec![b]);
    }

    #[test]
    fn test_path_bows_off_the_straight_line() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        let path = interpolate_path(a, b, 12);
        // Δ⊥ = (0, -100): the first half bends toward negative y.
        assert!(path[3].y < 0.0);
        assert!(path[9].y > 0.0);
    }

    #[test]
    fn test_smooth_short_input_unchanged() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert_eq!(smooth_path(&pts, 1.0), pts);
        assert!(smooth_path(&[], 0.5).is_empty());
    }

    #[test]
    fn test_smooth_keeps_endpoints_and_grows() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 100.0),
            Point::new(100.0, 0.0),
        ];
        let out = smooth_path(&pts, 1.0);
        assert_eq!(out.first(), pts.first());
        assert_eq!(out.last(), pts.last());
        assert!(out.len() > pts.len());
        assert_eq!(out[1], Point::new(12.5, 25.0));
    }

    #[test]
    fn test_speed_presets() {
        assert_eq!(
            SpeedPreset::for_speed(CursorSpeed::Fast),
            SpeedPreset {
                steps: 12,
                delay_ms: 6
            }
        );
        assert_eq!(SpeedPreset::for_speed(CursorSpeed::Normal).steps, 18);
        assert_eq!(SpeedPreset::for_speed(CursorSpeed::Slow).delay_ms, 12);
    }

    proptest! {
        #[test]
        fn prop_easing_is_symmetric(t in 0.0f64..=1.0) {
            let sum = ease_in_out_cubic(t) + ease_in_out_cubic(1.0 - t);
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_path_endpoints(
            ax in -2000.0f64..2000.0, ay in -2000.0f64..2000.0,
            bx in -2000.0f64..2000.0, by in -2000.0f64..2000.0,
            steps in 1usize..64,
        ) {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            let path = interpolate_path(a, b, steps);
            prop_assert_eq!(path.len(), steps + 1);
            prop_assert!(path[0].distance_to(&a) < 1e-6);
            prop_assert!(path[steps].distance_to(&b) < 1e-6);
        }
    }
}
