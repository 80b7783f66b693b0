//! Logging setup
//!
//! `RUST_LOG` wins over the configured level. Output is human-readable
//! (`pretty`) or one JSON object per line (`json`), to stderr or to the
//! configured file.

use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than "json" falls back to pretty output
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(level: &str) -> String {
    let level = match level.trim().to_lowercase().as_str() {
        l @ ("trace" | "debug" | "info" | "warn" | "error") => l.to_string(),
        _ => "info".to_string(),
    };
    format!("medhere={},tower_http=debug", level)
}

/// Initialize the global subscriber
///
/// Call once at startup; later calls are ignored. Fails only if the log file
/// cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    let layer: Box<dyn Layer<Registry> + Send + Sync> =
        match (LogFormat::parse(&config.format), &config.file) {
            (LogFormat::Json, Some(path)) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                fmt::layer().json().with_writer(Mutex::new(file)).boxed()
            }
            (LogFormat::Pretty, Some(path)) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed()
            }
            (LogFormat::Json, None) => fmt::layer().json().boxed(),
            (LogFormat::Pretty, None) => fmt::layer().with_target(true).boxed(),
        };

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .try_init();
    Ok(())
}

/// Minimal subscriber for tests
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Pretty);
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("debug"), "medhere=debug,tower_http=debug");
        assert_eq!(default_filter("loud"), "medhere=info,tower_http=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_test_logging();
        assert!(init_logging(&LoggingConfig::default()).is_ok());
    }
}
