//! ---
//! vdash_section: "01-core-functionality"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Tracing subscriber setup for console diagnostics and the dashboard log."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{Directive, EnvFilter, Targets};
use tracing_subscriber::fmt as subscriber_fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "VDASH_LOG";

/// Target used for the per-cycle metric and alert records. Events on this target
/// are written to the dashboard log file only, never to the console.
pub const RECORD_TARGET: &str = "vdash::record";

/// Line format of the dashboard log file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Pretty,
    StructuredJson,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "structured-json" | "json" => Ok(LogFormat::StructuredJson),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::StructuredJson => f.write_str("structured-json"),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// * `VDASH_LOG` overrides the filter (e.g. `info`, `debug,vdash_sim=trace`); when unset
///   `RUST_LOG` is honoured, finally defaulting to `info`. Records on [`RECORD_TARGET`]
///   stay enabled at `info` whatever the directive says.
/// * Warnings and errors go to stderr so the dashboard on stdout stays readable.
/// * When file logging is enabled every event, including the per-cycle records, is
///   appended to `LoggingConfig::file_path` with RFC 3339 UTC timestamps. A log file
///   that cannot be opened is reported as a warning and the run continues without it.
///
/// The returned guard flushes the file writer when dropped; hold it until exit.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid {} directive ({}); defaulting to info logging",
                LOG_ENV, err
            );
            EnvFilter::new("info")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
    .add_directive(
        format!("{RECORD_TARGET}=info")
            .parse::<Directive>()
            .context("invalid record target directive")?,
    );

    let console_layer = subscriber_fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(
            Targets::new()
                .with_default(LevelFilter::WARN)
                .with_target(RECORD_TARGET, LevelFilter::OFF),
        )
        .boxed();

    let mut guard = None;
    let mut file_error = None;
    let file_layer = if config.enabled {
        match open_log_file(config) {
            Ok(appender) => {
                let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
                guard = Some(file_guard);
                let layer = match config.format {
                    LogFormat::StructuredJson => subscriber_fmt::layer()
                        .with_target(true)
                        .with_timer(subscriber_fmt::time::UtcTime::rfc_3339())
                        .json()
                        .with_writer(file_writer)
                        .boxed(),
                    LogFormat::Pretty => subscriber_fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_timer(subscriber_fmt::time::UtcTime::rfc_3339())
                        .with_writer(file_writer)
                        .boxed(),
                };
                Some(layer)
            }
            Err(err) => {
                file_error = Some(err);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();

    if let Some(err) = file_error {
        warn!(error = %format!("{err:#}"), "dashboard log disabled");
    }
    info!(service = %service_name, log_file = %config.file_path().display(), format = %config.format, "tracing initialised");
    Ok(guard)
}

/// Open the dashboard log for appending, creating its directory first.
fn open_log_file(config: &LoggingConfig) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "unable to create log directory {}",
            config.directory.display()
        )
    })?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(config.file_name.as_str())
        .build(&config.directory)
        .with_context(|| format!("unable to open log file {}", config.file_path().display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_format_parses_aliases() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::StructuredJson);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::StructuredJson.to_string(), "structured-json");
    }

    #[test]
    fn init_creates_log_directory() -> Result<()> {
        let temp = tempdir()?;
        let config = LoggingConfig {
            directory: temp.path().join("nested"),
            ..LoggingConfig::default()
        };
        let guard = init_tracing("vdash-test", &config)?;
        assert!(guard.is_some());
        assert!(config.directory.is_dir());
        Ok(())
    }

    #[test]
    fn init_without_file_logging_succeeds() -> Result<()> {
        let config = LoggingConfig {
            enabled: false,
            directory: "never/created".into(),
            ..LoggingConfig::default()
        };
        let guard = init_tracing("vdash-test", &config)?;
        assert!(guard.is_none());
        assert!(!config.directory.exists());
        Ok(())
    }

    #[test]
    fn file_name_naming_a_directory_disables_file_log() -> Result<()> {
        let temp = tempdir()?;
        std::fs::create_dir(temp.path().join("sub"))?;
        let config = LoggingConfig {
            directory: temp.path().to_path_buf(),
            file_name: "sub".to_owned(),
            ..LoggingConfig::default()
        };
        assert!(open_log_file(&config).is_err());
        assert!(init_tracing("vdash-test", &config)?.is_none());
        Ok(())
    }

    #[test]
    fn directory_naming_a_file_disables_file_log() -> Result<()> {
        let temp = tempdir()?;
        let occupied = temp.path().join("bad.ini");
        std::fs::write(&occupied, "[THRESHOLDS]\n")?;
        let config = LoggingConfig {
            directory: occupied,
            ..LoggingConfig::default()
        };
        let err = open_log_file(&config).unwrap_err();
        assert!(err.to_string().contains("unable to create log directory"));
        assert!(init_tracing("vdash-test", &config)?.is_none());
        Ok(())
    }
}
