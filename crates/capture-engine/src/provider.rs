//! Automation provider interface.
//!
//! A provider owns one headless browser session: it performs the scripted
//! interactions and streams screen samples into a [`SampleProducer`] while
//! capture is running. The recorder only ever talks to this trait.

use democast_common::error::DemocastResult;
use democast_model::{BoundingBox, Point, ViewportSize, WaitUntil};

use crate::channel::SampleProducer;

/// Abstract interface over a controllable, capturable browser session.
#[async_trait::async_trait]
pub trait AutomationProvider: Send {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Launch a headless session with the given viewport.
    async fn launch(&mut self, viewport: ViewportSize) -> DemocastResult<()>;

    /// Begin streaming samples. The provider must await each
    /// [`SampleProducer::send`] before emitting the next sample.
    async fn start_screencast(&mut self, producer: SampleProducer) -> DemocastResult<()>;

    /// Stop streaming samples.
    async fn stop_screencast(&mut self) -> DemocastResult<()>;

    /// Navigate and wait for the given readiness condition.
    async fn navigate(&mut self, url: &str, wait_until: WaitUntil) -> DemocastResult<()>;

    /// Evaluate a script in the page.
    async fn evaluate(&mut self, script: &str) -> DemocastResult<serde_json::Value>;

    /// Bounding box of the first element matching `selector`, waiting up to
    /// `timeout_ms` for it to become visible.
    async fn bounding_box(&mut self, selector: &str, timeout_ms: u64)
        -> DemocastResult<BoundingBox>;

    /// Move the native mouse pointer.
    async fn mouse_move(&mut self, to: Point) -> DemocastResult<()>;

    /// Native click on `selector`, holding the button for `delay_ms`.
    async fn click(&mut self, selector: &str, delay_ms: u64) -> DemocastResult<()>;

    /// Native hover over `selector`.
    async fn hover(&mut self, selector: &str) -> DemocastResult<()>;

    /// Type a single character into the focused element.
    async fn press_key(&mut self, key: char) -> DemocastResult<()>;

    /// Scroll the window (or the element matching `selector`) by an offset.
    async fn scroll(
        &mut self,
        selector: Option<&str>,
        dx: f64,
        dy: f64,
        smooth: bool,
    ) -> DemocastResult<()>;

    /// Release the session and any processes behind it.
    async fn close(&mut self) -> DemocastResult<()>;
}

/// Page scripts the recorder evaluates.
pub mod scripts {
    /// Resolves after two animation frames, i.e. once content has painted.
    pub const PAINT_SIGNAL: &str =
        "new Promise((r) => requestAnimationFrame(() => requestAnimationFrame(r)))";

    /// An invisible style flip that forces the compositor to repaint.
    pub fn repaint(toggle: bool) -> String {
        let outline = if toggle {
            "0.001px solid transparent"
        } else {
            "none"
        };
        format!("document.documentElement.style.outline = '{outline}'")
    }

    /// Whether `script` is one of the repaint toggles.
    pub fn is_repaint(script: &str) -> bool {
        script.starts_with("document.documentElement.style.outline")
    }
}

#[cfg(test)]
mod tests {
    use super::scripts;

    #[test]
    fn test_repaint_scripts_alternate() {
        assert_ne!(scripts::repaint(true), scripts::repaint(false));
        assert!(scripts::is_repaint(&scripts::repaint(true)));
        assert!(!scripts::is_repaint(scripts::PAINT_SIGNAL));
    }
}
