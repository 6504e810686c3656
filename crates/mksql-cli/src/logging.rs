//! Logging setup for the `mksql` binary
//!
//! All output goes to stderr through a `tracing` subscriber. `RUST_LOG`
//! takes precedence over the filter derived from `-v`.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored when stderr is a terminal
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Default log level filter, used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            include_location: cfg!(debug_assertions),
            default_filter: Self::filter_for_verbosity(0),
        }
    }
}

impl LoggingConfig {
    /// Filter for a `-v` count: 0 = info, 1 = debug, 2+ = trace (row dumps)
    pub fn filter_for_verbosity(verbose: u8) -> String {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        ["mksql", "mksql_core", "mksql_interchange", "mksql_driver_sqlite"]
            .iter()
            .fold(String::from("warn"), |filter, target| {
                format!("{filter},{target}={level}")
            })
    }

    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.default_filter = Self::filter_for_verbosity(verbose);
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Initialize the logging system with the given configuration
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    // RUST_LOG environment variable takes precedence over default filter
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))?;

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .compact()
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()?;

    tracing::debug!(format = ?config.format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.default_filter.contains("mksql_interchange=info"));
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(LoggingConfig::filter_for_verbosity(1).contains("mksql_core=debug"));
        assert!(LoggingConfig::filter_for_verbosity(2).contains("mksql_core=trace"));
        assert!(LoggingConfig::filter_for_verbosity(9).contains("mksql_core=trace"));
    }

    #[test]
    fn test_filters_parse() {
        for verbose in 0..3 {
            let filter = LoggingConfig::filter_for_verbosity(verbose);
            assert!(EnvFilter::try_new(&filter).is_ok(), "{filter}");
        }
    }
}
