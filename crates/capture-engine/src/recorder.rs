//! Scenario recording.
//!
//! Drives an [`AutomationProvider`] through a scenario while a collector
//! task drains the sample channel. Every sample is stamped on arrival with
//! the recording clock; every synthetic cursor move, click, keystroke and
//! step start is stamped on the same clock, so overlay state for any frame
//! is a lookup into the timeline.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use democast_common::clock::RecordingClock;
use democast_common::error::{DemocastError, DemocastResult};
use democast_model::{
    is_safe_selector, Action, CaptureTimeline, Point, RawSample, RecordedSession, ResolvedFrame,
    Scenario, ViewportSize,
};
use democast_processing_core::{interpolate_path, resample, smooth_path, SpeedPreset};

use crate::channel::{sample_channel, SampleConsumer};
use crate::provider::{scripts, AutomationProvider};

/// Pause after every action.
pub const ACTION_GAP_MS: u64 = 30;
/// Interval between repaint toggles while waiting.
pub const REPAINT_INTERVAL_MS: u64 = 50;
/// Grace period for in-flight samples after the screencast stops.
pub const STOP_GRACE_MS: u64 = 200;

const NAVIGATION_SETTLE_MS: u64 = 300;
const CURSOR_SETTLE_MS: u64 = 100;
const SCROLL_SETTLE_MS: u64 = 150;
const INSTANT_SCROLL_MS: u64 = 100;
const MIN_SMOOTH_SCROLL_MS: f64 = 600.0;
const SCREENSHOT_SETTLE_MS: u64 = 100;
const PATH_SMOOTHING_TENSION: f64 = 0.5;

/// Recorder tuning.
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    /// How long to wait for a selector to become visible.
    pub element_timeout_ms: u64,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            element_timeout_ms: 5000,
        }
    }
}

/// A failed recording. Everything captured up to the failure is kept.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("step {step} ({action}) failed: {source}")]
    Action {
        step: usize,
        action: &'static str,
        #[source]
        source: DemocastError,
        partial: Box<RecordedSession>,
    },

    #[error("capture failed: {source}")]
    Capture {
        #[source]
        source: DemocastError,
        partial: Box<RecordedSession>,
    },

    #[error("could not start recording: {0}")]
    Setup(#[source] DemocastError),
}

impl RecordError {
    /// The partial session, when one was recorded.
    pub fn partial(&self) -> Option<&RecordedSession> {
        match self {
            Self::Action { partial, .. } | Self::Capture { partial, .. } => Some(partial),
            Self::Setup(_) => None,
        }
    }

    pub fn into_partial(self) -> Option<RecordedSession> {
        match self {
            Self::Action { partial, .. } | Self::Capture { partial, .. } => Some(*partial),
            Self::Setup(_) => None,
        }
    }
}

impl From<RecordError> for DemocastError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Action { source, .. }
            | RecordError::Capture { source, .. }
            | RecordError::Setup(source) => source,
        }
    }
}

/// Per-run state. Created fresh for every [`Recorder::record`] call.
struct RecordingState {
    clock: RecordingClock,
    viewport: ViewportSize,
    preset: SpeedPreset,
    smoothing: bool,
    timeline: CaptureTimeline,
    cursor: Point,
    first_content_ms: Option<f64>,
    capturing: bool,
}

impl RecordingState {
    fn new(scenario: &Scenario) -> Self {
        Self {
            clock: RecordingClock::start(),
            viewport: scenario.viewport,
            preset: SpeedPreset::for_speed(scenario.effects.cursor.speed),
            smoothing: scenario.effects.cursor.smoothing,
            timeline: CaptureTimeline::new(),
            cursor: Point::ORIGIN,
            first_content_ms: None,
            capturing: false,
        }
    }

    /// Trim pre-content samples, resolve overlay state per sample, then
    /// resample to the output rate.
    fn into_session(
        self,
        samples: Vec<RawSample>,
        start_ms: f64,
        end_ms: f64,
        fps: u32,
    ) -> RecordedSession {
        let raw = samples.len();
        let kept: Vec<RawSample> = match self.first_content_ms {
            Some(first) => samples
                .into_iter()
                .filter(|s| s.arrival_ms >= first)
                .collect(),
            None => samples,
        };

        let frames: Vec<ResolvedFrame> = kept
            .into_iter()
            .enumerate()
            .map(|(i, sample)| {
                self.timeline
                    .resolve_frame(i, sample.image, sample.arrival_ms, self.viewport)
            })
            .collect();
        let resolved = frames.len();
        let frames = resample(frames, &self.timeline, end_ms - start_ms, fps);

        tracing::debug!(
            raw,
            resolved,
            resampled = frames.len(),
            "Built recorded session"
        );

        RecordedSession {
            frames,
            timeline: self.timeline,
            start_ms,
            end_ms,
            first_content_ms: self.first_content_ms,
        }
    }
}

struct CaptureHandle {
    stop: oneshot::Sender<()>,
    collector: JoinHandle<Vec<RawSample>>,
}

/// Runs scenarios against one automation provider.
pub struct Recorder {
    provider: Box<dyn AutomationProvider>,
    options: RecorderOptions,
}

impl Recorder {
    pub fn new(provider: Box<dyn AutomationProvider>) -> Self {
        Self::with_options(provider, RecorderOptions::default())
    }

    pub fn with_options(provider: Box<dyn AutomationProvider>, options: RecorderOptions) -> Self {
        Self { provider, options }
    }

    /// Record `scenario`. The browser session is released on every path.
    pub async fn record(&mut self, scenario: &Scenario) -> Result<RecordedSession, RecordError> {
        tracing::info!(
            scenario = %scenario.name,
            provider = self.provider.name(),
            steps = scenario.steps.len(),
            "Starting recording"
        );

        let outcome = match self.provider.launch(scenario.viewport).await {
            Ok(()) => self.run(scenario).await,
            Err(e) => Err(RecordError::Setup(e)),
        };

        if let Err(e) = self.provider.close().await {
            tracing::warn!(error = %e, "Failed to release browser session");
        }

        match &outcome {
            Ok(session) => tracing::info!(
                frames = session.frames.len(),
                duration_ms = session.duration_ms(),
                "Recording complete"
            ),
            Err(e) => tracing::error!(
                error = %e,
                partial_frames = e.partial().map(|p| p.frames.len()).unwrap_or(0),
                "Recording failed"
            ),
        }
        outcome
    }

    async fn run(&mut self, scenario: &Scenario) -> Result<RecordedSession, RecordError> {
        let mut state = RecordingState::new(scenario);
        let fps = scenario.output.fps;
        let start_ms = state.clock.now_ms();

        let capture = match self.start_capture(&mut state).await {
            Ok(capture) => capture,
            Err(source) => {
                let end_ms = state.clock.now_ms();
                return Err(RecordError::Capture {
                    source,
                    partial: Box::new(state.into_session(Vec::new(), start_ms, end_ms, fps)),
                });
            }
        };

        let mut failure = None;
        'steps: for (index, step) in scenario.steps.iter().enumerate() {
            state.timeline.mark_step(index, state.clock.now_ms());
            tracing::info!(
                step = index,
                name = step.name.as_deref().unwrap_or(""),
                actions = step.actions.len(),
                "Running step"
            );

            for action in &step.actions {
                if let Err(source) = self.execute(&mut state, action).await {
                    failure = Some((index, action.kind(), source));
                    break 'steps;
                }
            }

            self.wait_with_repaints(&state, step.capture_delay).await;
            self.wait_with_repaints(&state, step.hold_duration).await;
        }

        let (samples, capture_error) = self.stop_capture(&mut state, capture).await;
        let end_ms = state.clock.now_ms();
        let partial = |state: RecordingState, samples: Vec<RawSample>| {
            Box::new(state.into_session(samples, start_ms, end_ms, fps))
        };

        match (failure, capture_error) {
            (Some((step, action, source)), _) => Err(RecordError::Action {
                step,
                action,
                source,
                partial: partial(state, samples),
            }),
            (None, Some(source)) => Err(RecordError::Capture {
                source,
                partial: partial(state, samples),
            }),
            (None, None) => Ok(state.into_session(samples, start_ms, end_ms, fps)),
        }
    }

    async fn start_capture(&mut self, state: &mut RecordingState) -> DemocastResult<CaptureHandle> {
        let (producer, consumer) = sample_channel();
        let (stop, stop_rx) = oneshot::channel();
        let collector = tokio::spawn(collect_samples(consumer, state.clock.clone(), stop_rx));

        if let Err(e) = self.provider.start_screencast(producer).await {
            let _ = stop.send(());
            let _ = collector.await;
            return Err(e);
        }

        state.capturing = true;
        state
            .timeline
            .push_cursor(state.cursor, state.clock.now_ms());
        tracing::debug!("Screencast started");
        Ok(CaptureHandle { stop, collector })
    }

    async fn stop_capture(
        &mut self,
        state: &mut RecordingState,
        capture: CaptureHandle,
    ) -> (Vec<RawSample>, Option<DemocastError>) {
        state.capturing = false;
        let stopped = self.provider.stop_screencast().await;
        sleep(Duration::from_millis(STOP_GRACE_MS)).await;
        let _ = capture.stop.send(());

        let samples = match capture.collector.await {
            Ok(samples) => samples,
            Err(e) => {
                return (
                    Vec::new(),
                    Some(DemocastError::capture(format!("sample collector failed: {e}"))),
                )
            }
        };
        tracing::debug!(samples = samples.len(), "Screencast stopped");
        (samples, stopped.err())
    }

    async fn execute(&mut self, state: &mut RecordingState, action: &Action) -> DemocastResult<()> {
        tracing::debug!(action = action.kind(), selector = ?action.selector(), "Executing action");

        match action {
            Action::Navigate { url, wait_until } => {
                self.provider.navigate(url, *wait_until).await?;
                if let Err(e) = self.provider.evaluate(scripts::PAINT_SIGNAL).await {
                    tracing::debug!(error = %e, "Paint signal unavailable");
                }
                if state.first_content_ms.is_none() {
                    state.first_content_ms = Some(state.clock.now_ms());
                }
                self.wait_with_repaints(state, NAVIGATION_SETTLE_MS).await;
            }
            Action::Click { selector, delay } => {
                let target = self.element_center(selector).await?;
                self.move_cursor(state, target).await?;
                state.timeline.push_click(target, state.clock.now_ms());
                self.provider.click(selector, delay.unwrap_or(0)).await?;
            }
            Action::Type {
                selector,
                text,
                delay,
            } => {
                let target = self.element_center(selector).await?;
                self.move_cursor(state, target).await?;
                state.timeline.push_click(target, state.clock.now_ms());
                self.provider.click(selector, 0).await?;
                for ch in text.chars() {
                    self.provider.press_key(ch).await?;
                    state
                        .timeline
                        .push_keystroke(ch.to_string(), state.clock.now_ms());
                    sleep(Duration::from_millis(*delay)).await;
                }
            }
            Action::Scroll {
                selector,
                x,
                y,
                smooth,
            } => {
                let target = match selector {
                    Some(s) => Some(self.element_center(s).await?),
                    None => None,
                };
                self.provider
                    .scroll(selector.as_deref(), *x, *y, *smooth)
                    .await?;
                if let Some(target) = target {
                    state.cursor = target;
                    state.timeline.push_cursor(target, state.clock.now_ms());
                }
                let settle = if *smooth {
                    ((x.abs() + y.abs()) * 0.8).round().max(MIN_SMOOTH_SCROLL_MS) as u64
                } else {
                    INSTANT_SCROLL_MS
                };
                self.wait_with_repaints(state, settle).await;
                self.wait_with_repaints(state, SCROLL_SETTLE_MS).await;
            }
            Action::Wait { duration } => {
                self.wait_with_repaints(state, *duration).await;
            }
            Action::Hover { selector } => {
                let target = self.element_center(selector).await?;
                self.move_cursor(state, target).await?;
                self.provider.hover(selector).await?;
            }
            Action::Screenshot { name, .. } => {
                tracing::debug!(name = name.as_deref().unwrap_or(""), "Screenshot marker");
                self.wait_with_repaints(state, SCREENSHOT_SETTLE_MS).await;
            }
        }

        self.wait_with_repaints(state, ACTION_GAP_MS).await;
        Ok(())
    }

    async fn element_center(&mut self, selector: &str) -> DemocastResult<Point> {
        if !is_safe_selector(selector) {
            return Err(DemocastError::InvalidSelector {
                selector: selector.to_string(),
            });
        }
        let bounds = self
            .provider
            .bounding_box(selector, self.options.element_timeout_ms)
            .await?;
        Ok(bounds.center())
    }

    /// Glide the pointer from its current position to `target`, stamping a
    /// keyframe per path point.
    async fn move_cursor(&mut self, state: &mut RecordingState, target: Point) -> DemocastResult<()> {
        let mut path = interpolate_path(state.cursor, target, state.preset.steps);
        let mut delay_ms = state.preset.delay_ms as f64;
        if state.smoothing && path.len() >= 3 {
            let travel_ms = delay_ms * path.len() as f64;
            path = smooth_path(&path, PATH_SMOOTHING_TENSION);
            delay_ms = travel_ms / path.len() as f64;
        }

        for point in path {
            self.provider.mouse_move(point).await?;
            state.timeline.push_cursor(point, state.clock.now_ms());
            sleep(RecordingClock::ms_to_duration(delay_ms)).await;
        }

        state.cursor = target;
        self.wait_with_repaints(state, CURSOR_SETTLE_MS).await;
        Ok(())
    }

    /// Wait `duration_ms` while forcing a repaint every interval, so a
    /// screencast that only emits on change still produces samples during
    /// static holds.
    async fn wait_with_repaints(&mut self, state: &RecordingState, duration_ms: u64) {
        if duration_ms == 0 {
            return;
        }
        let deadline = Instant::now() + Duration::from_millis(duration_ms);
        let mut toggle = true;

        while state.capturing && Instant::now() < deadline {
            if let Err(e) = self.provider.evaluate(&scripts::repaint(toggle)).await {
                tracing::trace!(error = %e, "Repaint toggle failed");
            }
            toggle = !toggle;

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            sleep(remaining.min(Duration::from_millis(REPAINT_INTERVAL_MS))).await;
        }
    }
}

/// Drain the sample channel until told to stop, stamping and
/// acknowledging each sample as it arrives.
async fn collect_samples(
    mut consumer: SampleConsumer,
    clock: RecordingClock,
    mut stop: oneshot::Receiver<()>,
) -> Vec<RawSample> {
    let mut samples = Vec::new();
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            delivery = consumer.recv() => match delivery {
                Some(delivery) => {
                    let arrival_ms = clock.now_ms();
                    samples.push(RawSample {
                        image: delivery.ack(),
                        arrival_ms,
                    });
                }
                None => break,
            },
        }
    }
    consumer.close();
    samples
}
