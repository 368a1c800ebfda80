//! Device mockups drawn around the captured page.

use democast_model::{DeviceFrameConfig, DeviceKind, Point, RgbaFrame};

use crate::color::{Rgba8, TRANSPARENT};
use crate::raster::{Fill, Layer, RasterProvider, Shape};

pub const TITLE_BAR_HEIGHT: u32 = 40;

const TRAFFIC_LIGHT_Y: f64 = 14.0;
const TRAFFIC_LIGHT_RADIUS: f64 = 6.0;
const TRAFFIC_LIGHTS_START_X: f64 = 16.0;
const TRAFFIC_LIGHT_GAP: f64 = 22.0;
const ADDRESS_BAR_HEIGHT: f64 = 24.0;
const ADDRESS_BAR_MARGIN: f64 = 70.0;

/// Bezel thickness a device frame adds around the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceInset {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl DeviceInset {
    const fn new(sides: u32, top: u32, bottom: u32) -> Self {
        Self {
            left: sides,
            top,
            right: sides,
            bottom,
        }
    }

    /// Shift a content-space point into framed-image space.
    pub fn offset(&self, p: Point) -> Point {
        p.offset(self.left as f64, self.top as f64)
    }
}

struct MobileSpec {
    inset: DeviceInset,
    outer_radius: f64,
    inner_radius: f64,
    light_body: u32,
}

const IPHONE: MobileSpec = MobileSpec {
    inset: DeviceInset::new(12, 50, 34),
    outer_radius: 47.0,
    inner_radius: 39.0,
    light_body: 0xf5f5f7,
};
const IPAD: MobileSpec = MobileSpec {
    inset: DeviceInset::new(20, 24, 24),
    outer_radius: 18.0,
    inner_radius: 12.0,
    light_body: 0xf5f5f7,
};
const ANDROID: MobileSpec = MobileSpec {
    inset: DeviceInset::new(8, 32, 20),
    outer_radius: 35.0,
    inner_radius: 30.0,
    light_body: 0xe8e8e8,
};

/// Content offset for the configured frame; zero when no frame is drawn.
pub fn device_inset(config: &DeviceFrameConfig) -> DeviceInset {
    if !config.enabled {
        return DeviceInset::default();
    }
    match config.kind {
        DeviceKind::Browser => DeviceInset {
            top: TITLE_BAR_HEIGHT,
            ..DeviceInset::default()
        },
        DeviceKind::Iphone => IPHONE.inset,
        DeviceKind::Ipad => IPAD.inset,
        DeviceKind::Android => ANDROID.inset,
        DeviceKind::Macbook | DeviceKind::None => DeviceInset::default(),
    }
}

/// Wrap `frame` in the configured device frame. The result is larger than
/// the input by the frame's inset.
pub fn apply_device_frame<R: RasterProvider + ?Sized>(
    raster: &R,
    frame: RgbaFrame,
    config: &DeviceFrameConfig,
) -> RgbaFrame {
    if !config.enabled {
        return frame;
    }
    match config.kind {
        DeviceKind::Browser => browser_chrome(raster, frame, config.dark_mode),
        DeviceKind::Iphone => mobile(raster, frame, &IPHONE, config.dark_mode, iphone_details),
        DeviceKind::Ipad => mobile(raster, frame, &IPAD, config.dark_mode, ipad_details),
        DeviceKind::Android => mobile(raster, frame, &ANDROID, config.dark_mode, android_details),
        DeviceKind::Macbook | DeviceKind::None => frame,
    }
}

fn browser_chrome<R: RasterProvider + ?Sized>(
    raster: &R,
    frame: RgbaFrame,
    dark: bool,
) -> RgbaFrame {
    let (w, h) = (frame.width, frame.height);
    let (bar, address, border, text) = if dark {
        (hex(0x2d2d2d), hex(0x1a1a1a), hex(0x444444), hex(0x999999))
    } else {
        (hex(0xe8e8e8), hex(0xffffff), hex(0xd0d0d0), hex(0x666666))
    };

    let mut layers = vec![Layer::new(Shape::Rect {
        x: 0.0,
        y: 0.0,
        width: w as f64,
        height: TITLE_BAR_HEIGHT as f64,
        radius: 0.0,
        color: bar,
    })];
    for (i, color) in [hex(0xff5f57), hex(0xfebc2e), hex(0x28c840)].into_iter().enumerate() {
        layers.push(Layer::new(Shape::Circle {
            center: Point::new(
                TRAFFIC_LIGHTS_START_X + TRAFFIC_LIGHT_GAP * i as f64,
                TRAFFIC_LIGHT_Y,
            ),
            radius: TRAFFIC_LIGHT_RADIUS,
            color,
        }));
    }

    let address_width = w as f64 - ADDRESS_BAR_MARGIN * 2.0;
    if address_width > 0.0 {
        let y = (TITLE_BAR_HEIGHT as f64 - ADDRESS_BAR_HEIGHT) / 2.0;
        layers.push(Layer::new(Shape::Rect {
            x: ADDRESS_BAR_MARGIN - 1.0,
            y: y - 1.0,
            width: address_width + 2.0,
            height: ADDRESS_BAR_HEIGHT + 2.0,
            radius: 7.0,
            color: border,
        }));
        layers.push(Layer::new(Shape::Rect {
            x: ADDRESS_BAR_MARGIN,
            y,
            width: address_width,
            height: ADDRESS_BAR_HEIGHT,
            radius: 6.0,
            color: address,
        }));
        let label = "localhost";
        let label_width = label.len() as f64 * 12.0 * 0.62;
        layers.push(Layer::new(Shape::Text {
            x: (w as f64 - label_width) / 2.0,
            y: y + 5.0,
            size: 12.0,
            text: label.to_string(),
            color: text,
        }));
    }
    layers.push(Layer::new(Shape::Image {
        frame,
        x: 0,
        y: TITLE_BAR_HEIGHT as i64,
    }));

    let canvas = raster.blank(w, h + TITLE_BAR_HEIGHT, &Fill::Solid(TRANSPARENT));
    raster.composite(canvas, &layers)
}

fn mobile<R: RasterProvider + ?Sized>(
    raster: &R,
    frame: RgbaFrame,
    spec: &MobileSpec,
    dark: bool,
    details: fn(f64, f64, bool) -> Vec<Layer>,
) -> RgbaFrame {
    let inset = spec.inset;
    let (w, h) = (frame.width, frame.height);
    let total_w = w + inset.left + inset.right;
    let total_h = h + inset.top + inset.bottom;
    let body = hex(if dark { 0x1a1a1a } else { spec.light_body });

    let mut layers = vec![
        Layer::new(Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: total_w as f64,
            height: total_h as f64,
            radius: spec.outer_radius,
            color: body,
        }),
        Layer::new(Shape::Rect {
            x: inset.left as f64,
            y: inset.top as f64,
            width: w as f64,
            height: h as f64,
            radius: spec.inner_radius,
            color: hex(0x000000),
        }),
        Layer::new(Shape::Image {
            frame: raster.mask_rounded(frame, spec.inner_radius),
            x: inset.left as i64,
            y: inset.top as i64,
        }),
    ];
    layers.extend(details(total_w as f64, total_h as f64, dark));

    let canvas = raster.blank(total_w, total_h, &Fill::Solid(TRANSPARENT));
    raster.composite(canvas, &layers)
}

fn iphone_details(total_w: f64, total_h: f64, dark: bool) -> Vec<Layer> {
    let (island_w, island_h) = (120.0, 36.0);
    let (bar_w, bar_h) = (134.0, 5.0);
    let top = IPHONE.inset.top as f64;
    let bottom = IPHONE.inset.bottom as f64;
    vec![
        Layer::new(Shape::Rect {
            x: (total_w - island_w) / 2.0,
            y: (top - island_h) / 2.0 + 4.0,
            width: island_w,
            height: island_h,
            radius: island_h / 2.0,
            color: if dark { hex(0x000000) } else { hex(0x1a1a1a) },
        }),
        Layer::new(Shape::Rect {
            x: (total_w - bar_w) / 2.0,
            y: total_h - bottom / 2.0 - bar_h / 2.0,
            width: bar_w,
            height: bar_h,
            radius: bar_h / 2.0,
            color: if dark { hex(0x555555) } else { hex(0x333333) },
        }),
    ]
}

fn ipad_details(total_w: f64, _total_h: f64, dark: bool) -> Vec<Layer> {
    vec![Layer::new(Shape::Circle {
        center: Point::new(total_w / 2.0, IPAD.inset.top as f64 / 2.0),
        radius: 4.0,
        color: camera(dark),
    })]
}

fn android_details(total_w: f64, _total_h: f64, dark: bool) -> Vec<Layer> {
    vec![Layer::new(Shape::Circle {
        center: Point::new(total_w / 2.0, ANDROID.inset.top as f64 / 2.0),
        radius: 6.0,
        color: camera(dark),
    })]
}

fn camera(dark: bool) -> Rgba8 {
    if dark {
        hex(0x2a2a2a)
    } else {
        hex(0x3a3a3a)
    }
}

fn hex(rgb: u32) -> Rgba8 {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ImageRaster;

    fn config(kind: DeviceKind) -> DeviceFrameConfig {
        DeviceFrameConfig {
            enabled: true,
            kind,
            dark_mode: false,
        }
    }

    #[test]
    fn test_insets() {
        assert_eq!(device_inset(&config(DeviceKind::Browser)).top, 40);
        assert_eq!(device_inset(&config(DeviceKind::Browser)).left, 0);
        assert_eq!(
            device_inset(&config(DeviceKind::Iphone)),
            DeviceInset {
                left: 12,
                top: 50,
                right: 12,
                bottom: 34
            }
        );
        assert_eq!(device_inset(&config(DeviceKind::Ipad)).top, 24);
        assert_eq!(device_inset(&config(DeviceKind::Android)).left, 8);
        assert_eq!(device_inset(&config(DeviceKind::Macbook)), DeviceInset::default());
        let mut disabled = config(DeviceKind::Iphone);
        disabled.enabled = false;
        assert_eq!(device_inset(&disabled), DeviceInset::default());
    }

    #[test]
    fn test_browser_frame_adds_title_bar_above_content() {
        let raster = ImageRaster::new();
        let content = RgbaFrame::filled(200, 100, [10, 20, 30, 255]);
        let framed = apply_device_frame(&raster, content, &config(DeviceKind::Browser));
        assert_eq!((framed.width, framed.height), (200, 140));
        assert_eq!(framed.pixel(100, 90), Some([10, 20, 30, 255]));
        assert_eq!(framed.pixel(199, 2), Some(hex(0xe8e8e8)));
    }

    #[test]
    fn test_mobile_frame_grows_by_bezel() {
        let raster = ImageRaster::new();
        let content = RgbaFrame::filled(390, 700, [200, 0, 0, 255]);
        let framed = apply_device_frame(&raster, content, &config(DeviceKind::Iphone));
        assert_eq!((framed.width, framed.height), (390 + 24, 700 + 84));
        // screen centre shows content; outer corner is transparent
        assert_eq!(framed.pixel(12 + 195, 50 + 350), Some([200, 0, 0, 255]));
        assert_eq!(framed.pixel(0, 0).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_macbook_passes_through() {
        let raster = ImageRaster::new();
        let content = RgbaFrame::filled(8, 8, [1, 1, 1, 255]);
        let out = apply_device_frame(&raster, content.clone(), &config(DeviceKind::Macbook));
        assert_eq!(out, content);
    }
}
