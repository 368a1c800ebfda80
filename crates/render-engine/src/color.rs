//! CSS-style color and gradient parsing for effect configuration values.

/// Straight-alpha RGBA.
pub type Rgba8 = [u8; 4];

pub const TRANSPARENT: Rgba8 = [0, 0, 0, 0];
pub const WHITE: Rgba8 = [255, 255, 255, 255];
pub const BLACK: Rgba8 = [0, 0, 0, 255];

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`, `rgba(...)`, or a
/// handful of keywords.
pub fn parse_color(value: &str) -> Option<Rgba8> {
    let v = value.trim();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = v.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    match lower.as_str() {
        "transparent" => Some(TRANSPARENT),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "red" => Some([255, 0, 0, 255]),
        "green" => Some([0, 128, 0, 255]),
        "blue" => Some([0, 0, 255, 255]),
        "gray" | "grey" => Some([128, 128, 128, 255]),
        _ => None,
    }
}

/// [`parse_color`] with a fallback, logging unparseable values.
pub fn color_or(value: &str, fallback: Rgba8) -> Rgba8 {
    parse_color(value).unwrap_or_else(|| {
        tracing::warn!(value, "Unrecognized color; using fallback");
        fallback
    })
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some([nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17, 255]),
        4 => Some([
            nibble(0)? * 17,
            nibble(1)? * 17,
            nibble(2)? * 17,
            nibble(3)? * 17,
        ]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba8> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(a) => {
            let a = match a.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => a.parse::<f64>().ok()?,
            };
            (a.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha])
}

/// A CSS `linear-gradient(<angle>deg, <color> <pct>%, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub angle_deg: f64,
    /// `(offset in [0,1], color)`, ascending by offset.
    pub stops: Vec<(f64, Rgba8)>,
}

impl LinearGradient {
    /// Parse a gradient string. Anything that is not a gradient is treated
    /// as a single color at 135°.
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim();
        let Some(inner) = v
            .strip_prefix("linear-gradient(")
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return parse_color(v).map(|c| Self {
                angle_deg: 135.0,
                stops: vec![(0.0, c), (1.0, c)],
            });
        };

        let parts = split_top_level(inner);
        let (angle_part, stop_parts) = parts.split_first()?;
        let angle_deg = angle_part.trim().strip_suffix("deg")?.trim().parse().ok()?;

        let count = stop_parts.len();
        let mut stops = Vec::with_capacity(count);
        for (i, raw) in stop_parts.iter().enumerate() {
            let raw = raw.trim();
            // The color may itself contain spaces (rgba(0, 0, 0, 1)).
            let (color, offset) = match raw.rfind(' ') {
                Some(pos) if raw[pos + 1..].ends_with('%') => (&raw[..pos], Some(&raw[pos + 1..])),
                _ => (raw, None),
            };
            let offset = match offset {
                Some(pct) => pct.trim_end_matches('%').parse::<f64>().ok()? / 100.0,
                None if count > 1 => i as f64 / (count - 1) as f64,
                None => 0.0,
            };
            stops.push((offset.clamp(0.0, 1.0), parse_color(color)?));
        }
        if stops.is_empty() {
            return None;
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(Self { angle_deg, stops })
    }

    /// Color at position `t` along the gradient line.
    pub fn sample(&self, t: f64) -> Rgba8 {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let ((o0, c0), (o1, c1)) = (pair[0], pair[1]);
            if t <= o1 {
                let span = (o1 - o0).max(f64::EPSILON);
                let f = (t - o0) / span;
                let mut out = [0u8; 4];
                for (i, ch) in out.iter_mut().enumerate() {
                    *ch = (c0[i] as f64 + (c1[i] as f64 - c0[i] as f64) * f).round() as u8;
                }
                return out;
            }
        }
        last.1
    }

    /// Project pixel `(x, y)` of a `width`×`height` box onto the gradient
    /// line. The line runs through the centre at `angle_deg` (0° points up,
    /// 90° right) and spans the box's bounding diagonal.
    pub fn position(&self, x: f64, y: f64, width: f64, height: f64) -> f64 {
        let rad = (self.angle_deg - 90.0).to_radians();
        let (dx, dy) = (rad.cos(), rad.sin());
        let half = (width * dx.abs() + height * dy.abs()) / 2.0;
        if half <= 0.0 {
            return 0.0;
        }
        let (cx, cy) = (width / 2.0, height / 2.0);
        (((x - cx) * dx + (y - cy) * dy) / half + 1.0) / 2.0
    }
}

/// Split on commas that are not inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color("#fff"), Some(WHITE));
        assert_eq!(parse_color("#3b82f6"), Some([59, 130, 246, 255]));
        assert_eq!(parse_color("#00000080"), Some([0, 0, 0, 128]));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(
            parse_color("rgba(59, 130, 246, 0.5)"),
            Some([59, 130, 246, 128])
        );
        assert_eq!(parse_color("rgb(1,2,3)"), Some([1, 2, 3, 255]));
        assert_eq!(parse_color("RGBA(0,0,0,50%)"), Some([0, 0, 0, 128]));
        assert_eq!(parse_color("rgba(1,2)"), None);
    }

    #[test]
    fn test_gradient_parse_and_sample() {
        let g = LinearGradient::parse("linear-gradient(135deg, #667eea 0%, #764ba2 100%)").unwrap();
        assert_eq!(g.angle_deg, 135.0);
        assert_eq!(g.stops.len(), 2);
        assert_eq!(g.sample(0.0), [0x66, 0x7e, 0xea, 255]);
        assert_eq!(g.sample(1.0), [0x76, 0x4b, 0xa2, 255]);
        let mid = g.sample(0.5);
        assert!(mid[0] > 0x66 && mid[0] < 0x76);
    }

    #[test]
    fn test_gradient_with_rgba_stops_and_implicit_offsets() {
        let g = LinearGradient::parse("linear-gradient(90deg, rgba(0, 0, 0, 1), #fff)").unwrap();
        assert_eq!(g.stops, vec![(0.0, BLACK), (1.0, WHITE)]);
    }

    #[test]
    fn test_plain_color_as_gradient() {
        let g = LinearGradient::parse("#111111").unwrap();
        assert_eq!(g.sample(0.3), [17, 17, 17, 255]);
        assert!(LinearGradient::parse("linear-gradient(oops)").is_none());
    }

    #[test]
    fn test_gradient_position_endpoints() {
        let g = LinearGradient::parse("linear-gradient(90deg, #000 0%, #fff 100%)").unwrap();
        assert!((g.position(0.0, 50.0, 100.0, 100.0) - 0.0).abs() < 1e-9);
        assert!((g.position(100.0, 50.0, 100.0, 100.0) - 1.0).abs() < 1e-9);
        assert!((g.position(50.0, 0.0, 100.0, 100.0) - 0.5).abs() < 1e-9);
    }
}
