//! Logging & Request Tracing Config

use std::time::Duration;

use clap::Args;

/// Targets that are only interesting when something is wrong.
const QUIET_TARGETS: [&str; 4] = ["h2", "hyper", "sqlx", "lopdf"];

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs, one object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Default log level or `EnvFilter` directives
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    /// `EnvFilter` directives: the configured level, with transport, database and PDF
    /// internals held at `warn`.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        QUIET_TARGETS
            .iter()
            .fold(self.log_level.clone(), |directives, target| {
                format!("{directives},{target}=warn")
            })
    }
}

/// Request tracing settings.
#[derive(Debug, Args)]
pub struct ObservabilityConfig {
    /// Requests slower than this many milliseconds are logged at warn
    #[arg(long, env = "SLOW_REQUEST_THRESHOLD_MS", default_value_t = 1_000_u64)]
    pub slow_request_threshold_ms: u64,
}

impl ObservabilityConfig {
    #[must_use]
    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_threshold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noisy_targets_are_quietened() {
        let config = LoggingConfig {
            log_level: "debug".to_string(),
            log_format: LogFormat::Json,
        };

        assert_eq!(
            config.filter_directives(),
            "debug,h2=warn,hyper=warn,sqlx=warn,lopdf=warn"
        );
    }
}
