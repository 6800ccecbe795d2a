//! Structured logging for the venvalid binary.
//!
//! - stdout is reserved for command payloads
//! - stderr receives all log output (human or JSONL)
//! - events carry variable names and origins, never values

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Directive applying `level` to both venvalid crates.
pub fn default_directive(level: LogLevel) -> String {
    format!("venvalid={level},venvalid_cli={level}")
}

/// Filter directive for `config`.
///
/// An explicit level (VENVALID_LOG, `-v`, `-q`) always wins. Otherwise a
/// raw `RUST_LOG` directive is honoured as given.
pub fn filter_directive(config: &LogConfig, rust_log: Option<&str>) -> String {
    match rust_log {
        Some(directive) if !config.level_explicit && !directive.trim().is_empty() => {
            directive.to_string()
        }
        _ => default_directive(config.level),
    }
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. A second call
/// is ignored.
pub fn init_logging(config: &LogConfig) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::try_new(filter_directive(config, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.level)));

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(config.ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}
