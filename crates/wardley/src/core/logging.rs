//! Logging infrastructure for map processing
//!
//! Structured logging uses the `tracing` crate. The decoder and layout engine
//! only emit spans and events; installing a subscriber is left to the
//! embedding program, which can use [`init_logging`] for the usual setup.
//!
//! # Usage
//!
//! ```rust,no_run
//! use wardley::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).ok();
//!
//! // Or with custom level and format
//! init_logging(Some("debug"), Some("pretty")).ok();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `WARDLEY_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `WARDLEY_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Alternative way to set log level (tracing-subscriber standard)
//!
//! # Filtering Logs
//!
//! ```bash
//! # Show per-block decode events
//! RUST_LOG="wardley::map::assembler=debug" wardley convert -i map.json
//!
//! # Everything at info, layout at trace
//! RUST_LOG="info,wardley::map::layout=trace" wardley convert -i map.json
//! ```

use std::str::FromStr;

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// An explicit `level` is used as is. Without one the filter comes from
/// `WARDLEY_LOG_LEVEL`, then `RUST_LOG`, then `info`. `format` falls back to
/// `WARDLEY_LOG_FORMAT`, then `compact`.
///
/// Returns an error for an unknown format or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_format = format
        .map(|s| s.to_string())
        .or_else(|| std::env::var("WARDLEY_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string());
    let format =
        LogFormat::from_str(&log_format).map_err(|e| format!("Invalid log format: {}", e))?;

    Registry::default()
        .with(env_filter(level))
        .with(fmt_layer(format))
        .try_init()?;
    Ok(())
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}

fn env_filter(level: Option<&str>) -> EnvFilter {
    if let Some(level) = level {
        return EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    }
    std::env::var("WARDLEY_LOG_LEVEL")
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    // Logs go to stderr so map JSON on stdout stays clean
    let layer = fmt::layer().with_writer(std::io::stderr).with_level(true);
    match format {
        LogFormat::Compact => layer
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .boxed(),
        LogFormat::Pretty => layer
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .pretty()
            .boxed(),
        LogFormat::Json => layer
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .json()
            .boxed(),
    }
}
