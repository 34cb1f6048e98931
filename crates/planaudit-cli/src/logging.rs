//! Logging and tracing setup for the planaudit binary
//!
//! Diagnostics go to stderr so the report on stdout stays clean. `RUST_LOG`
//! takes precedence over the configured default filter.

use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log span open/close events
    pub enable_spans: bool,

    /// Whether to colour the output
    pub ansi: bool,

    /// Default log level filter
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            include_location: false,
            enable_spans: false,
            ansi: true,
            default_filter: "warn,planaudit=info,planaudit_services=info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create a configuration for the given number of `-v` flags
    pub fn verbose(level: u8) -> Self {
        match level {
            0 => Self::default(),
            1 => Self {
                default_filter: "info,planaudit=debug,planaudit_core=debug,planaudit_driver_sqlite=debug,planaudit_services=debug".to_string(),
                ..Self::default()
            },
            _ => Self {
                include_location: true,
                enable_spans: true,
                default_filter: "debug,planaudit=trace,planaudit_core=trace,planaudit_driver_sqlite=trace,planaudit_services=trace".to_string(),
                ..Self::default()
            },
        }
    }

    /// Create a testing configuration (no colours, everything enabled)
    #[cfg(test)]
    pub fn testing() -> Self {
        Self {
            include_location: true,
            enable_spans: true,
            ansi: false,
            default_filter: "debug".to_string(),
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(span_events)
        .with_ansi(config.ansi)
        .with_filter(env_filter)
        .boxed();

    tracing_subscriber::registry().with(console_layer).try_init()?;

    tracing::debug!(filter = %config.default_filter, "Logging system initialized");

    Ok(())
}
