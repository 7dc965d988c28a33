//! Global tracing subscriber setup.

use std::path::PathBuf;

use haat_core::error::{HaatError, Result};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::tracing_layer::{DiagnosticEvent, DiagnosticsLayer};

/// Checked before `RUST_LOG`.
pub const LOG_ENV: &str = "HAAT_LOG";

#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter used when neither `HAAT_LOG` nor `RUST_LOG` is set.
    pub default_filter: String,
    /// Daily rolling `haat.log.*` files are written here when set.
    pub log_dir: Option<PathBuf>,
    pub diagnostics: Option<mpsc::UnboundedSender<DiagnosticEvent>>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_filter: "warn".to_string(),
            log_dir: None,
            diagnostics: None,
        }
    }
}

/// Keeps the file writer flushing; hold it until the process exits.
#[must_use = "log lines are lost once the guard is dropped"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber: a stderr formatter and an optional
/// rolling log file, both behind the env filter, plus the optional
/// diagnostics channel which always receives debug-level haat events.
pub fn init_logging(options: LoggingOptions) -> Result<LoggingGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(&options.default_filter));

    let (file_layer, file_guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "haat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter(&options.default_filter));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let diagnostics_layer = options
        .diagnostics
        .map(|sender| DiagnosticsLayer::new(sender).with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(diagnostics_layer)
        .try_init()
        .map_err(|e| HaatError::internal(format!("Failed to install tracing subscriber: {}", e)))?;

    if let Some(dir) = &options.log_dir {
        tracing::debug!(log_dir = %dir.display(), "Logging initialized");
    }
    Ok(LoggingGuard { _file: file_guard })
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter))
}
