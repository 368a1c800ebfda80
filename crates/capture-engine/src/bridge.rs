//! External automation driver over JSON lines.
//!
//! The driver is any program that speaks this protocol on stdio, typically
//! a thin script around a headless-browser library:
//!
//! ```text
//! democast → driver   {"id":1,"method":"navigate","params":{"url":"…","waitUntil":"load"}}
//! driver → democast   {"id":1,"result":null}
//! driver → democast   {"id":2,"error":{"kind":"elementNotFound","message":"…"}}
//! driver → democast   {"event":"sample","data":"<base64 image>"}
//! democast → driver   {"method":"ackSample"}
//! ```
//!
//! The driver must not emit another sample until the previous one has been
//! acknowledged. Anything the driver writes to stderr is logged at debug.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use democast_common::error::{DemocastError, DemocastResult};
use democast_model::{BoundingBox, Point, ViewportSize, WaitUntil};

use crate::channel::SampleProducer;
use crate::provider::AutomationProvider;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const EXIT_TIMEOUT: Duration = Duration::from_secs(2);
const SCREENCAST_QUALITY: u8 = 95;

type Reply = Result<Value, DriverError>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;
type Stdin = Arc<AsyncMutex<ChildStdin>>;

/// Error object in a driver response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverError {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl DriverError {
    fn closed() -> Self {
        Self {
            kind: "closed".into(),
            message: "automation driver exited".into(),
        }
    }

    /// Map onto the crate error, using the request params for context.
    pub fn into_error(self, method: &str, params: &Value) -> DemocastError {
        let param = |key: &str| params.get(key).and_then(Value::as_str).unwrap_or("").to_string();
        match self.kind.as_str() {
            "elementNotFound" => DemocastError::ElementNotFound {
                selector: param("selector"),
                timeout_ms: params.get("timeout").and_then(Value::as_u64).unwrap_or(0),
            },
            "navigation" => DemocastError::Navigation {
                url: param("url"),
                message: self.message,
            },
            "closed" => DemocastError::resource(self.message),
            _ => DemocastError::action(format!("{method}: {}", self.message)),
        }
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    params: &'a Value,
}

/// Any line the driver writes to stdout.
#[derive(Debug, Default, Deserialize)]
struct Incoming {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<DriverError>,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

struct Running {
    child: Child,
    stdin: Stdin,
    reader: JoinHandle<()>,
}

/// [`AutomationProvider`] backed by an external driver process.
pub struct BridgeProvider {
    command: Vec<String>,
    running: Option<Running>,
    pending: Pending,
    producer: Arc<Mutex<Option<SampleProducer>>>,
    viewport: ViewportSize,
    next_id: u64,
    request_timeout: Duration,
}

impl BridgeProvider {
    /// `command` is the program followed by its arguments.
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            running: None,
            pending: Arc::default(),
            producer: Arc::default(),
            viewport: ViewportSize::default(),
            next_id: 0,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn spawn(&mut self) -> DemocastResult<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| DemocastError::resource("no automation driver command configured"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    DemocastError::resource(format!("automation driver not found: {program}"))
                }
                _ => DemocastError::resource(format!("failed to start {program}: {e}")),
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DemocastError::resource("driver stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DemocastError::resource("driver stdout unavailable"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(target: "democast::driver", "{line}");
                }
            });
        }

        let stdin: Stdin = Arc::new(AsyncMutex::new(stdin));
        let reader = tokio::spawn(read_driver_output(
            stdout,
            stdin.clone(),
            self.pending.clone(),
            self.producer.clone(),
        ));
        tracing::info!(program = %program, pid = ?child.id(), "Automation driver started");

        self.running = Some(Running {
            child,
            stdin,
            reader,
        });
        Ok(())
    }

    async fn call(&mut self, method: &str, params: Value) -> DemocastResult<Value> {
        let stdin = self
            .running
            .as_ref()
            .map(|r| r.stdin.clone())
            .ok_or_else(|| DemocastError::resource("automation driver is not running"))?;

        self.next_id += 1;
        let id = self.next_id;
        let (tx, rx) = oneshot::channel();
        lock(&self.pending).insert(id, tx);

        let line = serde_json::to_string(&Request {
            id,
            method,
            params: &params,
        })?;
        if let Err(e) = write_line(&stdin, line).await {
            lock(&self.pending).remove(&id);
            return Err(e);
        }

        let reply = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(DriverError::closed()),
            Err(_) => {
                lock(&self.pending).remove(&id);
                return Err(DemocastError::resource(format!(
                    "driver did not answer {method} within {}s",
                    self.request_timeout.as_secs()
                )));
            }
        };
        reply.map_err(|e| e.into_error(method, &params))
    }
}

#[async_trait::async_trait]
impl AutomationProvider for BridgeProvider {
    fn name(&self) -> &str {
        "bridge"
    }

    async fn launch(&mut self, viewport: ViewportSize) -> DemocastResult<()> {
        if self.running.is_none() {
            self.spawn()?;
        }
        self.viewport = viewport;
        self.call(
            "launch",
            json!({ "width": viewport.width, "height": viewport.height }),
        )
        .await
        .map_err(|e| DemocastError::resource(format!("browser launch failed: {e}")))?;
        Ok(())
    }

    async fn start_screencast(&mut self, producer: SampleProducer) -> DemocastResult<()> {
        *lock(&self.producer) = Some(producer);
        let started = self
            .call(
                "startScreencast",
                json!({
                    "format": "jpeg",
                    "quality": SCREENCAST_QUALITY,
                    "maxWidth": self.viewport.width,
                    "maxHeight": self.viewport.height,
                }),
            )
            .await;
        if started.is_err() {
            lock(&self.producer).take();
        }
        started.map(|_| ())
    }

    async fn stop_screencast(&mut self) -> DemocastResult<()> {
        let stopped = self.call("stopScreencast", json!({})).await;
        lock(&self.producer).take();
        stopped.map(|_| ())
    }

    async fn navigate(&mut self, url: &str, wait_until: WaitUntil) -> DemocastResult<()> {
        self.call(
            "navigate",
            json!({ "url": url, "waitUntil": wait_until.as_str() }),
        )
        .await
        .map(|_| ())
    }

    async fn evaluate(&mut self, script: &str) -> DemocastResult<Value> {
        self.call("evaluate", json!({ "script": script })).await
    }

    async fn bounding_box(
        &mut self,
        selector: &str,
        timeout_ms: u64,
    ) -> DemocastResult<BoundingBox> {
        let value = self
            .call(
                "boundingBox",
                json!({ "selector": selector, "timeout": timeout_ms }),
            )
            .await?;
        if value.is_null() {
            return Err(DemocastError::element_not_found(selector, timeout_ms));
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn mouse_move(&mut self, to: Point) -> DemocastResult<()> {
        self.call("mouseMove", json!({ "x": to.x, "y": to.y }))
            .await
            .map(|_| ())
    }

    async fn click(&mut self, selector: &str, delay_ms: u64) -> DemocastResult<()> {
        self.call("click", json!({ "selector": selector, "delay": delay_ms }))
            .await
            .map(|_| ())
    }

    async fn hover(&mut self, selector: &str) -> DemocastResult<()> {
        self.call("hover", json!({ "selector": selector }))
            .await
            .map(|_| ())
    }

    async fn press_key(&mut self, key: char) -> DemocastResult<()> {
        self.call("pressKey", json!({ "key": key.to_string() }))
            .await
            .map(|_| ())
    }

    async fn scroll(
        &mut self,
        selector: Option<&str>,
        dx: f64,
        dy: f64,
        smooth: bool,
    ) -> DemocastResult<()> {
        self.call(
            "scroll",
            json!({ "selector": selector, "x": dx, "y": dy, "smooth": smooth }),
        )
        .await
        .map(|_| ())
    }

    async fn close(&mut self) -> DemocastResult<()> {
        if self.running.is_none() {
            return Ok(());
        }
        let result = self.call("close", json!({})).await.map(|_| ());

        let Some(Running {
            mut child,
            stdin,
            reader,
        }) = self.running.take()
        else {
            return result;
        };
        reader.abort();
        drop(stdin);
        lock(&self.producer).take();

        match tokio::time::timeout(EXIT_TIMEOUT, child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(%status, "Automation driver exited"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to reap automation driver"),
            Err(_) => {
                tracing::warn!("Automation driver did not exit; killing it");
                child.kill().await?;
            }
        }
        result
    }
}

/// Route replies to waiting calls and forward samples to the producer.
async fn read_driver_output(
    stdout: ChildStdout,
    stdin: Stdin,
    pending: Pending,
    producer: Arc<Mutex<Option<SampleProducer>>>,
) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let msg: Incoming = match serde_json::from_str(&line) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed driver message");
                continue;
            }
        };

        if let Some(id) = msg.id {
            let reply = match msg.error {
                Some(err) => Err(err),
                None => Ok(msg.result.unwrap_or(Value::Null)),
            };
            if let Some(tx) = lock(&pending).remove(&id) {
                let _ = tx.send(reply);
            }
            continue;
        }

        if msg.event.as_deref() == Some("sample") {
            forward_sample(msg.data.as_deref(), &producer).await;
            if let Err(e) = write_line(&stdin, r#"{"method":"ackSample"}"#.to_string()).await {
                tracing::warn!(error = %e, "Failed to acknowledge sample");
            }
        }
    }

    for (_, tx) in lock(&pending).drain() {
        let _ = tx.send(Err(DriverError::closed()));
    }
    tracing::debug!("Automation driver output closed");
}

async fn forward_sample(data: Option<&str>, producer: &Mutex<Option<SampleProducer>>) {
    let Some(data) = data else {
        return;
    };
    let image = match general_purpose::STANDARD.decode(data) {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping undecodable sample");
            return;
        }
    };
    let producer = lock(producer).clone();
    if let Some(producer) = producer {
        if producer.send(image).await.is_err() {
            tracing::trace!("Sample arrived after capture stopped");
        }
    }
}

async fn write_line(stdin: &Stdin, mut line: String) -> DemocastResult<()> {
    line.push('\n');
    let mut stdin = stdin.lock().await;
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await?;
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_keeps_selector_and_timeout() {
        let err = DriverError {
            kind: "elementNotFound".into(),
            message: "waiting for selector".into(),
        }
        .into_error("boundingBox", &json!({ "selector": "#cta", "timeout": 5000 }));
        assert!(matches!(
            err,
            DemocastError::ElementNotFound { ref selector, timeout_ms: 5000 } if selector == "#cta"
        ));
    }

    #[test]
    fn test_error_kinds() {
        let nav = DriverError {
            kind: "navigation".into(),
            message: "net::ERR_CONNECTION_REFUSED".into(),
        }
        .into_error("navigate", &json!({ "url": "http://localhost:9" }));
        assert!(matches!(nav, DemocastError::Navigation { ref url, .. } if url == "http://localhost:9"));

        let other = DriverError {
            kind: "".into(),
            message: "boom".into(),
        }
        .into_error("click", &json!({}));
        assert!(other.is_action_failure());
        assert!(!DriverError::closed().into_error("click", &json!({})).is_action_failure());
    }

    #[test]
    fn test_incoming_shapes() {
        let reply: Incoming = serde_json::from_str(r#"{"id":3,"result":{"x":1}}"#).unwrap();
        assert_eq!(reply.id, Some(3));
        assert!(reply.error.is_none());

        let sample: Incoming = serde_json::from_str(r#"{"event":"sample","data":"AAE="}"#).unwrap();
        assert_eq!(sample.event.as_deref(), Some("sample"));
        assert_eq!(
            general_purpose::STANDARD.decode(sample.data.unwrap()).unwrap(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_request_serialization() {
        let params = json!({ "selector": "#a" });
        let line = serde_json::to_string(&Request {
            id: 7,
            method: "hover",
            params: &params,
        })
        .unwrap();
        assert_eq!(line, r##"{"id":7,"method":"hover","params":{"selector":"#a"}}"##);
    }

    #[tokio::test]
    async fn test_missing_driver_is_resource_error() {
        let mut provider = BridgeProvider::new(vec!["democast-driver-that-does-not-exist".into()]);
        let err = provider.launch(ViewportSize::default()).await.unwrap_err();
        assert!(matches!(err, DemocastError::Resource { .. }));
        assert!(provider.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_command_is_resource_error() {
        let mut provider = BridgeProvider::new(Vec::new());
        assert!(matches!(
            provider.launch(ViewportSize::default()).await,
            Err(DemocastError::Resource { .. })
        ));
    }
}
