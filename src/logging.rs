//! Terminal logging for the native driver. Library code only uses `tracing` macros.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "epicmint=info,warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    /// `EPICMINT_LOG_JSON=1` wins; otherwise pretty on a terminal, compact when piped.
    pub fn from_env() -> Self {
        let json = std::env::var("EPICMINT_LOG_JSON").map(|v| v == "1").unwrap_or(false);
        if json {
            LogFormat::Json
        } else if std::io::stderr().is_terminal() {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        }
    }
}

pub fn init_logging() {
    init_logging_with(LogFormat::from_env());
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging_with(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
    };
}
