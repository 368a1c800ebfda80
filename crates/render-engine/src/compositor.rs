//! Frame compositor: turns resolved capture frames into finished output
//! frames.
//!
//! Every frame runs the same fixed stage order. A stage whose feature is
//! disabled, or whose input (cursor, click, keys) is absent, passes the
//! frame through.
//!
//! ```text
//!  decoded ─▶ device frame ─▶ highlight ─▶ trail ─▶ cursor ─▶ ripple ─▶ HUD
//!                                                                      │
//!  output ◀── resize ◀── watermark ◀── background ◀── zoom ◀───────────┘
//! ```

use std::sync::Arc;

use democast_common::error::{DemocastError, DemocastResult};
use democast_model::{
    EffectsConfig, FrameContext, OutputConfig, Point, RenderedFrame, ResolvedFrame, RgbaFrame,
    Scenario, Step,
};
use democast_processing_core::{
    apply_crossfades, apply_speed_ramp, compute_frame_contexts, fade_boundaries,
};

use crate::effects::{self, cursor, keystroke, DeviceInset};
use crate::raster::{ImageRaster, Layer, RasterProvider};

/// Callback invoked as frames are composed.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send + Sync>;

/// Compositing progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgress {
    pub stage: RenderStage,
    /// In `[0.0, 1.0]`.
    pub progress: f64,
    pub frames_done: usize,
    pub total_frames: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Preparing,
    Compositing,
    Crossfading,
    Complete,
}

/// Composes frames for one scenario's effects and output settings.
pub struct Compositor<R: RasterProvider = ImageRaster> {
    raster: R,
    effects: EffectsConfig,
    output: OutputConfig,
    steps: Vec<Step>,
    /// Background at output size, built once.
    canvas: RgbaFrame,
    progress: Option<ProgressCallback>,
}

impl<R: RasterProvider> Compositor<R> {
    pub fn new(raster: R, scenario: &Scenario) -> Self {
        let output = scenario.output.clone();
        let canvas = effects::background_canvas(
            &raster,
            &scenario.effects.background,
            output.width.max(1),
            output.height.max(1),
        );
        Self {
            raster,
            effects: scenario.effects.clone(),
            output,
            steps: scenario.steps.clone(),
            canvas,
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn raster(&self) -> &R {
        &self.raster
    }

    /// Run the whole sequence: speed ramp (when enabled), frame contexts,
    /// per-frame composition, then step crossfades.
    ///
    /// Fails up front when the keystroke HUD or watermark is enabled but the
    /// raster cannot draw text.
    pub fn compose_all(&self, frames: &[ResolvedFrame]) -> DemocastResult<Vec<RenderedFrame>> {
        if needs_text(&self.effects) && !self.raster.supports_text() {
            return Err(DemocastError::render(
                "keystroke and watermark overlays need a font; set render.font_path or install a system font",
            ));
        }
        let fps = self.output.fps.max(1);
        self.report(RenderStage::Preparing, 0, frames.len());

        let ramped;
        let frames = if self.effects.speed_ramp.enabled {
            ramped = apply_speed_ramp(frames, &self.effects.speed_ramp, fps);
            &ramped[..]
        } else {
            frames
        };

        let contexts = compute_frame_contexts(frames, &self.effects, fps);
        let total = frames.len();
        let mut rendered = Vec::with_capacity(total);
        // Resampled sequences repeat samples; decode each distinct image once.
        let mut last_decoded: Option<(Arc<[u8]>, RgbaFrame)> = None;

        for (frame, ctx) in frames.iter().zip(&contexts) {
            let image = match &last_decoded {
                Some((bytes, image)) if Arc::ptr_eq(bytes, &frame.image) => image.clone(),
                _ => {
                    let image = self.raster.decode(&frame.image)?;
                    last_decoded = Some((Arc::clone(&frame.image), image.clone()));
                    image
                }
            };
            rendered.push(RenderedFrame {
                index: frame.index,
                pixels: self.compose_decoded(image, frame, ctx),
                timestamp: frame.timestamp,
            });
            self.report(RenderStage::Compositing, rendered.len(), total);
        }

        let boundaries = fade_boundaries(frames, &self.steps);
        if !boundaries.is_empty() {
            self.report(RenderStage::Crossfading, total, total);
            apply_crossfades(&mut rendered, &boundaries, fps);
        }

        tracing::info!(
            frames = rendered.len(),
            crossfades = boundaries.len(),
            width = self.output.width,
            height = self.output.height,
            "Composited frames"
        );
        self.report(RenderStage::Complete, total, total);
        Ok(rendered)
    }

    /// Compose a single frame.
    pub fn compose_frame(
        &self,
        frame: &ResolvedFrame,
        ctx: &FrameContext,
    ) -> DemocastResult<RenderedFrame> {
        let image = self.raster.decode(&frame.image)?;
        Ok(RenderedFrame {
            index: frame.index,
            pixels: self.compose_decoded(image, frame, ctx),
            timestamp: frame.timestamp,
        })
    }

    fn compose_decoded(
        &self,
        image: RgbaFrame,
        frame: &ResolvedFrame,
        ctx: &FrameContext,
    ) -> RgbaFrame {
        let fx = &self.effects;
        let to_image = ViewportScale::new(frame, &image);
        let cursor_pos = frame.cursor_position.map(|p| to_image.apply(p));
        let click_pos = frame.click_position.map(|p| to_image.apply(p));

        let inset = effects::device_inset(&fx.device_frame);
        let mut image = effects::apply_device_frame(&self.raster, image, &fx.device_frame);
        let bounds = (image.width, image.height);

        let mut layers: Vec<Layer> = Vec::new();
        if fx.cursor.enabled {
            if let Some(pos) = cursor_pos {
                layers.extend(cursor::highlight(&fx.cursor, pos, inset));
            }
            let trail: Vec<Point> = ctx.cursor_trail.iter().map(|&p| to_image.apply(p)).collect();
            layers.extend(cursor::trail(&fx.cursor, &trail, inset));
            if let Some(pos) = cursor_pos {
                layers.extend(cursor::marker(&fx.cursor, pos, inset, bounds));
            }
            if let Some(click) = click_pos {
                let progress = ctx
                    .click_progress
                    .or(frame.click_progress)
                    .unwrap_or(0.5);
                layers.extend(cursor::ripple(&fx.cursor, click, progress, inset));
            }
        }
        if fx.keystroke.enabled {
            if let Some(hud) = keystroke::layout_hud(
                &fx.keystroke,
                &frame.keystrokes_active,
                frame.timestamp,
                bounds.0,
                bounds.1,
            ) {
                layers.extend(keystroke::hud_layers(&fx.keystroke, hud));
            }
        }
        image = self.raster.composite(image, &layers);

        if fx.zoom.enabled && ctx.zoom_scale > 1.0 {
            let focus = zoom_focus(click_pos, cursor_pos, inset, bounds);
            image = effects::apply_zoom(&self.raster, image, ctx.zoom_scale, focus);
        }

        image = effects::apply_background(&self.raster, image, &fx.background, &self.canvas);

        if let Some(mark) = effects::watermark_layer(&fx.watermark, image.width, image.height) {
            image = self.raster.composite(image, std::slice::from_ref(&mark));
        }

        self.raster
            .resize(&image, self.output.width.max(1), self.output.height.max(1))
    }

    fn report(&self, stage: RenderStage, frames_done: usize, total_frames: usize) {
        if let Some(cb) = &self.progress {
            let progress = if total_frames == 0 {
                1.0
            } else {
                frames_done as f64 / total_frames as f64
            };
            cb(RenderProgress {
                stage,
                progress,
                frames_done,
                total_frames,
            });
        }
    }
}

/// Whether any enabled effect draws text.
pub fn needs_text(effects: &EffectsConfig) -> bool {
    effects.keystroke.enabled || (effects.watermark.enabled && !effects.watermark.text.is_empty())
}

/// Zoom focus in framed-image space: the click, else the cursor, else the
/// centre of the framed image.
pub fn zoom_focus(
    click: Option<Point>,
    cursor: Option<Point>,
    inset: DeviceInset,
    bounds: (u32, u32),
) -> Point {
    click
        .or(cursor)
        .map(|p| inset.offset(p))
        .unwrap_or_else(|| Point::new(bounds.0 as f64 / 2.0, bounds.1 as f64 / 2.0))
}

/// Maps viewport coordinates onto a decoded image of a different size.
#[derive(Debug, Clone, Copy)]
struct ViewportScale {
    sx: f64,
    sy: f64,
}

impl ViewportScale {
    fn new(frame: &ResolvedFrame, image: &RgbaFrame) -> Self {
        let vw = frame.viewport.width.max(1) as f64;
        let vh = frame.viewport.height.max(1) as f64;
        Self {
            sx: image.width as f64 / vw,
            sy: image.height as f64 / vh,
        }
    }

    fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx, p.y * self.sy)
    }
}
