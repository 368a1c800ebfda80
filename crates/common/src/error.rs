//! Error types shared across democast crates.

/// Top-level error type for democast operations.
///
/// Variants group into the scenario, action, capture, encoding and
/// resource families; each carries the structured detail a caller needs
/// to render a precise message (selector, binary name, exit status).
#[derive(Debug, thiserror::Error)]
pub enum DemocastError {
    #[error("Scenario error: {message}")]
    Scenario { message: String },

    #[error("Invalid selector: {selector:?}")]
    InvalidSelector { selector: String },

    #[error("Element not found or not visible within {timeout_ms}ms: {selector}")]
    ElementNotFound { selector: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Action error: {message}")]
    Action { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Encoder binary not found: {binary}")]
    EncoderNotFound { binary: String },

    #[error("Encoder {binary} exited with status {status:?}: {stderr_tail}")]
    EncoderFailed {
        binary: String,
        status: Option<i32>,
        stderr_tail: String,
    },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("Resource error: {message}")]
    Resource { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DemocastError.
pub type DemocastResult<T> = Result<T, DemocastError>;

impl DemocastError {
    pub fn scenario(msg: impl Into<String>) -> Self {
        Self::Scenario {
            message: msg.into(),
        }
    }

    pub fn action(msg: impl Into<String>) -> Self {
        Self::Action {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
            message: msg.into(),
        }
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn element_not_found(selector: impl Into<String>, timeout_ms: u64) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            timeout_ms,
        }
    }

    /// Whether this error came from executing a scripted action
    /// (as opposed to the capture channel or resource lifecycle).
    pub fn is_action_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSelector { .. }
                | Self::ElementNotFound { .. }
                | Self::Navigation { .. }
                | Self::Action { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_detail() {
        let err = DemocastError::element_not_found("#submit", 5000);
        assert_eq!(
            err.to_string(),
            "Element not found or not visible within 5000ms: #submit"
        );

        let err = DemocastError::EncoderNotFound {
            binary: "ffmpeg".into(),
        };
        assert!(err.to_string().contains("ffmpeg"));
    }

    #[test]
    fn test_action_failure_classification() {
        assert!(DemocastError::action("boom").is_action_failure());
        assert!(DemocastError::InvalidSelector {
            selector: "<x>".into()
        }
        .is_action_failure());
        assert!(!DemocastError::capture("channel closed").is_action_failure());
        assert!(!DemocastError::resource("launch").is_action_failure());
    }
}
