//!
//! Setup logging subsystem.
//!

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use super::types::Level;

/// Logging configuration, usually deserialized from the console's config
/// file.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Console (stdout) sink.
    pub console: ConsoleLogConfig,
    /// Rolling file sink.
    pub file: FileLogConfig,
}

/// Stdout logging configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConsoleLogConfig {
    /// Whether the stdout sink is enabled.
    pub enabled: bool,
    /// Minimum level written to stdout; `RUST_LOG` overrides it.
    pub level: Level,
    /// Emit one JSON object per line instead of human-readable output.
    pub json: bool,
}

impl Default for ConsoleLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::Info,
            json: false,
        }
    }
}

/// Rolling file logging configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FileLogConfig {
    /// Whether the file sink is enabled.
    pub enabled: bool,
    /// Directory the hourly-rolled files are written to.
    pub path: String,
    /// File name prefix.
    pub file_name: String,
    /// Minimum level written to the file sink.
    pub level: Level,
}

/// Guard keeping the non-blocking file writer alive. Hold it for the process
/// lifetime; dropping it flushes and stops the background writer.
#[derive(Debug)]
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Setup logging sub-system, attaching the configured sinks to the global
/// subscriber.
pub fn setup(config: &LogConfig, service_name: &str) -> LogGuard {
    let mut file_guard = None;

    let file_layer = if config.file.enabled {
        let file_appender =
            tracing_appender::rolling::hourly(&config.file.path, &config.file.file_name);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        file_guard = Some(guard);

        Some(
            fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_filter(config.file.level.into_filter())
                .boxed(),
        )
    } else {
        None
    };

    let console_layer = if config.console.enabled {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.console.level.to_string()));
        let layer = if config.console.json {
            fmt::layer().json().boxed()
        } else {
            fmt::layer().boxed()
        };
        Some(layer.with_filter(env_filter))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!(service = service_name, "logger initialized");

    LogGuard {
        _file_guard: file_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_logs_to_stdout_only() {
        let config = LogConfig::default();
        assert!(config.console.enabled);
        assert!(!config.console.json);
        assert_eq!(config.console.level, Level::Info);
        assert!(!config.file.enabled);
    }

    #[test]
    fn config_deserializes_with_partial_sections() {
        let config: LogConfig = serde_json::from_str(
            r#"{"console": {"level": "DEBUG"}, "file": {"enabled": true, "path": "logs"}}"#,
        )
        .unwrap();
        assert!(config.console.enabled);
        assert_eq!(config.console.level, Level::Debug);
        assert!(config.file.enabled);
        assert_eq!(config.file.path, "logs");
    }

    // Installs a global subscriber, so exactly one test may call setup.
    #[test]
    fn setup_installs_the_configured_sinks() {
        let config = LogConfig {
            console: ConsoleLogConfig {
                enabled: true,
                level: Level::Off,
                json: false,
            },
            file: FileLogConfig::default(),
        };
        let guard = setup(&config, "console");
        assert!(format!("{guard:?}").contains("LogGuard"));
    }
}
