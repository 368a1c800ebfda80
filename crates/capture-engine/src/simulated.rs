//! In-process simulated browser.
//!
//! Models a page as a set of solid rectangles keyed by selector and renders
//! real PNG samples with `image`/`imageproc`. Like a real screencast it
//! only emits when something visual changes (navigation, repaint toggle,
//! pointer, focus, scroll, typing) and it honours the acknowledgement
//! contract of the sample channel. Used by `--dry-run` and by tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use democast_common::error::{DemocastError, DemocastResult};
use democast_model::{BoundingBox, Point, ViewportSize, WaitUntil};

use crate::channel::SampleProducer;
use crate::provider::{scripts, AutomationProvider};

const HEADER_HEIGHT: u32 = 48;
const GLYPH_WIDTH: u32 = 8;

/// What to do with a selector the page does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSelectors {
    /// Wait out the timeout, then fail with `ElementNotFound`.
    #[default]
    Fail,
    /// Invent a stable position from the selector text.
    Synthesize,
}

/// A rectangle on the simulated page.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedElement {
    pub selector: String,
    pub bounds: BoundingBox,
    pub color: [u8; 3],
}

/// Static description of the simulated page.
#[derive(Debug, Clone)]
pub struct SimulatedPage {
    pub elements: Vec<SimulatedElement>,
    pub unknown_selectors: UnknownSelectors,
    /// Time a navigation takes before it resolves.
    pub navigation_delay_ms: u64,
    /// URLs whose navigation fails.
    pub unreachable_urls: Vec<String>,
}

impl Default for SimulatedPage {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            unknown_selectors: UnknownSelectors::Fail,
            navigation_delay_ms: 120,
            unreachable_urls: Vec::new(),
        }
    }
}

/// Mutable page state; every change is a visual change.
#[derive(Debug, Clone, Default)]
struct PageState {
    url: Option<String>,
    scroll: (f64, f64),
    pointer: Point,
    hovered: Option<String>,
    focused: Option<String>,
    typed: String,
    outline: bool,
}

struct Screencast {
    stop: oneshot::Sender<()>,
    task: JoinHandle<DemocastResult<u64>>,
}

/// Shared log of the calls a provider received, in order.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn record(&self, entry: impl Into<String>) {
        if let Ok(mut entries) = self.0.lock() {
            entries.push(entry.into());
        }
    }

    /// Snapshot of all entries so far.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Whether any entry starts with `prefix`.
    pub fn contains(&self, prefix: &str) -> bool {
        self.entries().iter().any(|e| e.starts_with(prefix))
    }
}

/// Deterministic in-process [`AutomationProvider`].
pub struct SimulatedProvider {
    page: Arc<SimulatedPage>,
    viewport: Option<ViewportSize>,
    state: watch::Sender<PageState>,
    screencast: Option<Screencast>,
    journal: Journal,
}

impl SimulatedProvider {
    pub fn new(page: SimulatedPage) -> Self {
        let (state, _) = watch::channel(PageState::default());
        Self {
            page: Arc::new(page),
            viewport: None,
            state,
            screencast: None,
            journal: Journal::default(),
        }
    }

    /// A page where every selector resolves to a synthesized element.
    pub fn permissive() -> Self {
        Self::new(SimulatedPage {
            unknown_selectors: UnknownSelectors::Synthesize,
            ..SimulatedPage::default()
        })
    }

    /// Handle to the call journal; stays valid after the provider is boxed.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    fn viewport(&self) -> DemocastResult<ViewportSize> {
        self.viewport
            .ok_or_else(|| DemocastError::resource("simulated browser is not launched"))
    }

    fn lookup(&self, selector: &str) -> Option<BoundingBox> {
        let loaded = self.state.borrow().url.is_some();
        if !loaded {
            return None;
        }
        if let Some(el) = self.page.elements.iter().find(|e| e.selector == selector) {
            return Some(el.bounds);
        }
        match (self.page.unknown_selectors, self.viewport) {
            (UnknownSelectors::Synthesize, Some(vp)) => Some(synthesized_bounds(selector, vp)),
            _ => None,
        }
    }

    fn require(&self, selector: &str) -> DemocastResult<BoundingBox> {
        self.lookup(selector)
            .ok_or_else(|| DemocastError::element_not_found(selector, 0))
    }
}

#[async_trait::async_trait]
impl AutomationProvider for SimulatedProvider {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn launch(&mut self, viewport: ViewportSize) -> DemocastResult<()> {
        self.journal
            .record(format!("launch {}x{}", viewport.width, viewport.height));
        self.viewport = Some(viewport);
        Ok(())
    }

    async fn start_screencast(&mut self, producer: SampleProducer) -> DemocastResult<()> {
        let viewport = self.viewport()?;
        if self.screencast.is_some() {
            return Err(DemocastError::capture("screencast already running"));
        }
        self.journal.record("start_screencast");
        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_screencast(
            self.page.clone(),
            viewport,
            self.state.subscribe(),
            producer,
            stop_rx,
        ));
        self.screencast = Some(Screencast { stop, task });
        Ok(())
    }

    async fn stop_screencast(&mut self) -> DemocastResult<()> {
        let Some(screencast) = self.screencast.take() else {
            return Ok(());
        };
        self.journal.record("stop_screencast");
        let _ = screencast.stop.send(());
        let emitted = screencast
            .task
            .await
            .map_err(|e| DemocastError::capture(format!("screencast task failed: {e}")))??;
        tracing::debug!(emitted, "Simulated screencast stopped");
        Ok(())
    }

    async fn navigate(&mut self, url: &str, wait_until: WaitUntil) -> DemocastResult<()> {
        self.journal
            .record(format!("navigate {url} {}", wait_until.as_str()));
        self.viewport()?;
        tokio::time::sleep(Duration::from_millis(self.page.navigation_delay_ms)).await;
        if self.page.unreachable_urls.iter().any(|u| u == url) {
            return Err(DemocastError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.state.send_modify(|s| {
            s.url = Some(url.to_string());
            s.scroll = (0.0, 0.0);
            s.hovered = None;
            s.focused = None;
            s.typed.clear();
        });
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> DemocastResult<serde_json::Value> {
        if scripts::is_repaint(script) {
            self.state.send_modify(|s| s.outline = !s.outline);
        } else if script == scripts::PAINT_SIGNAL {
            // two frames at 60Hz
            tokio::time::sleep(Duration::from_millis(33)).await;
        } else {
            self.journal.record(format!("evaluate {script}"));
        }
        Ok(serde_json::Value::Null)
    }

    async fn bounding_box(
        &mut self,
        selector: &str,
        timeout_ms: u64,
    ) -> DemocastResult<BoundingBox> {
        self.journal.record(format!("bounding_box {selector}"));
        match self.lookup(selector) {
            Some(bounds) => {
                let (sx, sy) = self.state.borrow().scroll;
                Ok(BoundingBox::new(
                    bounds.x - sx,
                    bounds.y - sy,
                    bounds.width,
                    bounds.height,
                ))
            }
            None => {
                tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
                Err(DemocastError::element_not_found(selector, timeout_ms))
            }
        }
    }

    async fn mouse_move(&mut self, to: Point) -> DemocastResult<()> {
        self.state.send_modify(|s| s.pointer = to);
        Ok(())
    }

    async fn click(&mut self, selector: &str, delay_ms: u64) -> DemocastResult<()> {
        self.journal.record(format!("click {selector}"));
        self.require(selector)?;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        self.state.send_modify(|s| s.focused = Some(selector.to_string()));
        Ok(())
    }

    async fn hover(&mut self, selector: &str) -> DemocastResult<()> {
        self.journal.record(format!("hover {selector}"));
        self.require(selector)?;
        self.state
            .send_modify(|s| s.hovered = Some(selector.to_string()));
        Ok(())
    }

    async fn press_key(&mut self, key: char) -> DemocastResult<()> {
        if self.state.borrow().focused.is_none() {
            return Err(DemocastError::action("no element has focus"));
        }
        self.state.send_modify(|s| s.typed.push(key));
        Ok(())
    }

    async fn scroll(
        &mut self,
        selector: Option<&str>,
        dx: f64,
        dy: f64,
        smooth: bool,
    ) -> DemocastResult<()> {
        self.journal
            .record(format!("scroll {} {dx} {dy} {smooth}", selector.unwrap_or("window")));
        if let Some(selector) = selector {
            self.require(selector)?;
        }
        self.state.send_modify(|s| {
            s.scroll = ((s.scroll.0 + dx).max(0.0), (s.scroll.1 + dy).max(0.0));
        });
        Ok(())
    }

    async fn close(&mut self) -> DemocastResult<()> {
        self.journal.record("close");
        let result = self.stop_screencast().await;
        self.viewport = None;
        result
    }
}

/// Emit one sample now and one after every state change until stopped.
async fn run_screencast(
    page: Arc<SimulatedPage>,
    viewport: ViewportSize,
    mut state: watch::Receiver<PageState>,
    producer: SampleProducer,
    mut stop: oneshot::Receiver<()>,
) -> DemocastResult<u64> {
    let mut emitted = 0u64;
    loop {
        let snapshot = state.borrow_and_update().clone();
        let png = render_page(&page, viewport, &snapshot)?;
        tokio::select! {
            biased;
            _ = &mut stop => break,
            sent = producer.send(png) => {
                if sent.is_err() {
                    break;
                }
                emitted += 1;
            }
        }
        tokio::select! {
            biased;
            _ = &mut stop => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    Ok(emitted)
}

fn render_page(
    page: &SimulatedPage,
    viewport: ViewportSize,
    state: &PageState,
) -> DemocastResult<Vec<u8>> {
    let (w, h) = (viewport.width.max(1), viewport.height.max(1));
    let mut img = match state.url.as_deref() {
        Some(url) => paint_page(page, state, url, w, h),
        None => RgbImage::from_pixel(w, h, Rgb([255, 255, 255])),
    };

    // Marks the repaint toggle so consecutive samples are distinguishable,
    // blank page included.
    if state.outline {
        fill(&mut img, 0, h as i32 - 1, 1, 1, [254, 254, 254]);
    }

    encode_png(&img)
}

fn paint_page(page: &SimulatedPage, state: &PageState, url: &str, w: u32, h: u32) -> RgbImage {
    let tint = hash_color(url);
    let mut img = RgbImage::from_pixel(w, h, Rgb(lighten(tint, 0.85)));
    fill(&mut img, 0, 0, w, HEADER_HEIGHT.min(h), tint);

    let (sx, sy) = state.scroll;
    for el in &page.elements {
        let x = (el.bounds.x - sx).round() as i32;
        let y = (el.bounds.y - sy).round() as i32;
        let (ew, eh) = (el.bounds.width.round() as u32, el.bounds.height.round() as u32);
        let color = if state.hovered.as_deref() == Some(el.selector.as_str()) {
            lighten(el.color, 0.25)
        } else {
            el.color
        };
        fill(&mut img, x, y, ew, eh, color);

        if state.focused.as_deref() == Some(el.selector.as_str()) {
            for (i, _) in state.typed.chars().enumerate() {
                let gx = x + 6 + (i as u32 * GLYPH_WIDTH) as i32;
                fill(&mut img, gx, y + 6, GLYPH_WIDTH - 2, eh.saturating_sub(12), [30, 30, 30]);
            }
        }
    }
    img
}

fn fill(img: &mut RgbImage, x: i32, y: i32, w: u32, h: u32, color: [u8; 3]) {
    if w == 0 || h == 0 {
        return;
    }
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), Rgb(color));
}

fn encode_png(img: &RgbImage) -> DemocastResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, FilterType::NoFilter)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| DemocastError::capture(format!("failed to encode simulated sample: {e}")))?;
    Ok(bytes)
}

fn stable_hash(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

fn hash_color(s: &str) -> [u8; 3] {
    let h = stable_hash(s);
    [
        64 + (h & 0x7f) as u8,
        64 + ((h >> 8) & 0x7f) as u8,
        64 + ((h >> 16) & 0x7f) as u8,
    ]
}

fn lighten(c: [u8; 3], amount: f64) -> [u8; 3] {
    c.map(|v| (v as f64 + (255.0 - v as f64) * amount).round() as u8)
}

/// A stable, on-screen box for a selector the page does not define.
fn synthesized_bounds(selector: &str, viewport: ViewportSize) -> BoundingBox {
    let (w, h) = (160.0, 40.0);
    let h64 = stable_hash(selector);
    let span_x = (viewport.width as f64 - w).max(1.0);
    let span_y = (viewport.height as f64 - h - HEADER_HEIGHT as f64).max(1.0);
    let x = (h64 % 10_000) as f64 / 10_000.0 * span_x;
    let y = HEADER_HEIGHT as f64 + ((h64 >> 20) % 10_000) as f64 / 10_000.0 * span_y;
    BoundingBox::new(x.round(), y.round(), w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::sample_channel;

    fn page() -> SimulatedPage {
        SimulatedPage {
            elements: vec![SimulatedElement {
                selector: "#go".into(),
                bounds: BoundingBox::new(600.0, 380.0, 80.0, 40.0),
                color: [59, 130, 246],
            }],
            ..SimulatedPage::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_elements_resolve_only_after_navigation() {
        let mut provider = SimulatedProvider::new(page());
        provider.launch(ViewportSize::default()).await.unwrap();

        let err = provider.bounding_box("#go", 100).await.unwrap_err();
        assert!(matches!(err, DemocastError::ElementNotFound { timeout_ms: 100, .. }));

        provider
            .navigate("https://example.com", WaitUntil::Load)
            .await
            .unwrap();
        let bbox = provider.bounding_box("#go", 100).await.unwrap();
        assert_eq!(bbox.center(), Point::new(640.0, 400.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_selector_strict_vs_permissive() {
        let mut strict = SimulatedProvider::new(page());
        strict.launch(ViewportSize::default()).await.unwrap();
        strict.navigate("about:blank", WaitUntil::Load).await.unwrap();
        assert!(strict.bounding_box(".missing", 5000).await.is_err());

        let mut permissive = SimulatedProvider::permissive();
        permissive.launch(ViewportSize::default()).await.unwrap();
        permissive.navigate("about:blank", WaitUntil::Load).await.unwrap();
        let a = permissive.bounding_box(".missing", 5000).await.unwrap();
        let b = permissive.bounding_box(".missing", 5000).await.unwrap();
        assert_eq!(a, b);
        assert!(a.x >= 0.0 && a.x + a.width <= 1280.0);
        assert!(a.y >= HEADER_HEIGHT as f64 && a.y + a.height <= 800.0);
    }

    #[test]
    fn test_repaint_toggle_changes_blank_page() {
        let page = page();
        let viewport = ViewportSize::new(64, 48);
        let mut state = PageState::default();
        let plain = render_page(&page, viewport, &state).unwrap();
        state.outline = true;
        let marked = render_page(&page, viewport, &state).unwrap();
        assert_ne!(plain, marked);

        state.url = Some("https://example.com".into());
        let loaded = render_page(&page, viewport, &state).unwrap();
        state.outline = false;
        assert_ne!(loaded, render_page(&page, viewport, &state).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_screencast_emits_on_change() {
        let mut provider = SimulatedProvider::new(page());
        provider.launch(ViewportSize::new(200, 120)).await.unwrap();
        let (producer, mut consumer) = sample_channel();
        provider.start_screencast(producer).await.unwrap();

        // initial blank frame
        let first = consumer.recv().await.unwrap().ack();
        let decoded = image::load_from_memory(&first).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 120));

        provider
            .evaluate(&scripts::repaint(true))
            .await
            .unwrap();
        let second = consumer.recv().await.unwrap().ack();
        assert_ne!(first, second);

        provider.stop_screencast().await.unwrap();
        assert!(consumer.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_requires_focus() {
        let mut provider = SimulatedProvider::new(page());
        provider.launch(ViewportSize::default()).await.unwrap();
        provider.navigate("https://example.com", WaitUntil::Load).await.unwrap();
        assert!(provider.press_key('a').await.is_err());
        provider.click("#go", 0).await.unwrap();
        provider.press_key('a').await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_url() {
        let mut provider = SimulatedProvider::new(SimulatedPage {
            unreachable_urls: vec!["https://down.test".into()],
            ..SimulatedPage::default()
        });
        provider.launch(ViewportSize::default()).await.unwrap();
        let err = provider
            .navigate("https://down.test", WaitUntil::NetworkIdle)
            .await
            .unwrap_err();
        assert!(matches!(err, DemocastError::Navigation { .. }));
    }
}
