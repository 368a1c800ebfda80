//! Logging and tracing initialization.
//!
//! A bare level such as `debug` applies to democast's own crates only;
//! dependencies stay at `warn` so image and process plumbing does not drown
//! the recording log. A level containing `=` or `,` is used verbatim as an
//! `EnvFilter` directive list.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "DEMOCAST_LOG";

/// Log targets owned by this workspace.
const DEMOCAST_TARGETS: &[&str] = &[
    "democast",
    "democast_cli",
    "democast_common",
    "democast_model",
    "democast_processing_core",
    "democast_capture_engine",
    "democast_render_engine",
];

/// Expand a configured level into filter directives.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    let level = if level.is_empty() { "info" } else { level };
    let mut directives = vec!["warn".to_string()];
    directives.extend(DEMOCAST_TARGETS.iter().map(|t| format!("{t}={level}")));
    directives.join(",")
}

/// `DEMOCAST_LOG`, then `RUST_LOG`, then the configured level.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)))
}

/// Install the global tracing subscriber on stderr, keeping stdout free
/// for command output. Later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(
            builder
                .with_target(config.show_targets)
                .without_time()
                .finish(),
        )
    };
    if installed.is_ok() {
        tracing::debug!(json = config.json, level = %config.level, "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_to_workspace() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("democast_capture_engine=debug"));
        assert!(directives.contains("democast=debug"));
        assert!(directives.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_explicit_directives_pass_through() {
        assert_eq!(filter_directives("democast=trace,info"), "democast=trace,info");
        assert_eq!(filter_directives("image=debug"), "image=debug");
    }

    #[test]
    fn test_empty_level_defaults_to_info() {
        assert!(filter_directives("  ").contains("democast_model=info"));
    }
}
