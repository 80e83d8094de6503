//! Logging initialization for Finsight.
//!
//! Supports three formats:
//! - `pretty`: multi-line, human-readable output
//! - `component`: one compact line per event; use the [`log_component!`]
//!   macro to add a `component` field for per-subsystem filtering
//! - `json`: structured JSON lines for log aggregators

use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::Result;

/// Initialize the global tracing subscriber from config.
///
/// Call this once at startup before any tracing events are emitted.
/// `RUST_LOG` takes precedence over `cfg.level`. Logs go to stderr unless
/// `cfg.file` is set, so stdout stays free for command output.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let file = match &cfg.file {
        Some(path) => Some(Mutex::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        )),
        None => None,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // `try_init` fails only when a subscriber is already set; keep the first.
    match (cfg.format, file) {
        (LogFormat::Json, Some(file)) => builder.json().with_writer(file).try_init().ok(),
        (LogFormat::Json, None) => builder
            .json()
            .with_writer(std::io::stderr)
            .try_init()
            .ok(),
        (LogFormat::Pretty, Some(file)) => builder
            .pretty()
            .with_ansi(false)
            .with_writer(file)
            .try_init()
            .ok(),
        (LogFormat::Pretty, None) => builder
            .pretty()
            .with_writer(std::io::stderr)
            .try_init()
            .ok(),
        (LogFormat::Component, Some(file)) => builder
            .compact()
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .try_init()
            .ok(),
        (LogFormat::Component, None) => builder
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
            .ok(),
    };

    Ok(())
}

/// Emit a component-tagged tracing event.
///
/// Works with any tracing level (`trace`, `debug`, `info`, `warn`, `error`).
/// The `component` field makes it easy to grep logs by subsystem:
///
/// ```
/// # use finsight::log_component;
/// log_component!(info, "server", "request received");
/// log_component!(warn, "advisor", "statement trimmed", from = 15000u64, to = 13000u64);
/// ```
#[macro_export]
macro_rules! log_component {
    ($level:ident, $component:expr, $msg:expr) => {
        tracing::$level!(component = $component, $msg)
    };
    ($level:ident, $component:expr, $msg:expr, $($key:ident = $val:expr),+ $(,)?) => {
        tracing::$level!(component = $component, $($key = $val,)+ $msg)
    };
}
