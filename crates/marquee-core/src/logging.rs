//! Structured logging for native Marquee processes.
//!
//! Console output is human readable and filtered by `RUST_LOG` when set.
//! File output is JSON, rolled over on a schedule and capped to a number of
//! retained files. File logging goes through a non-blocking writer; keep the
//! returned [`LoggingGuard`] alive until shutdown so buffered lines flush.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Crate targets that get their own verbosity in the filters.
const MARQUEE_TARGETS: [&str; 2] = ["marquee", "marquee_core"];

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory holding log files.
    pub log_directory: PathBuf,
    /// File name prefix, e.g. `marquee` gives `marquee.2026-01-15`.
    pub log_file_prefix: String,
    /// Level for Marquee targets on the console.
    pub console_level: Level,
    /// Level for Marquee targets in the log file.
    pub file_level: Level,
    /// Rollover schedule.
    pub rotation: LogRotation,
    /// Rolled files to keep (0 keeps all).
    pub max_log_files: usize,
    /// Write JSON lines to disk at all.
    pub file_logging: bool,
    /// Colour console output.
    pub console_ansi: bool,
    /// Include source file and line.
    pub include_file_line: bool,
    /// Include the target module on the console.
    pub include_target: bool,
    /// Emit span open/close events.
    pub log_span_events: bool,
}

/// Log rotation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    /// Every minute.
    Minutely,
    /// Every hour.
    Hourly,
    /// Every day.
    Daily,
    /// Single file.
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Minutely => Self::MINUTELY,
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggingConfig {
    /// Verbose console, trace-level file, hourly files for a day.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "marquee".to_string(),
            console_level: Level::DEBUG,
            file_level: Level::TRACE,
            rotation: LogRotation::Hourly,
            max_log_files: 24,
            file_logging: true,
            console_ansi: true,
            include_file_line: true,
            include_target: true,
            log_span_events: true,
        }
    }

    /// Quiet console, debug-level file, daily files for a week.
    #[must_use]
    pub fn production() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "marquee".to_string(),
            console_level: Level::INFO,
            file_level: Level::DEBUG,
            rotation: LogRotation::Daily,
            max_log_files: 7,
            file_logging: true,
            console_ansi: true,
            include_file_line: false,
            include_target: false,
            log_span_events: false,
        }
    }

    /// Development in debug builds, production otherwise.
    #[must_use]
    pub fn auto() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Set the log directory.
    #[must_use]
    pub fn with_log_directory(mut self, path: PathBuf) -> Self {
        self.log_directory = path;
        self
    }

    /// Set the log file prefix.
    #[must_use]
    pub fn with_log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Set the console level.
    #[must_use]
    pub const fn with_console_level(mut self, level: Level) -> Self {
        self.console_level = level;
        self
    }

    /// Set the file level.
    #[must_use]
    pub const fn with_file_level(mut self, level: Level) -> Self {
        self.file_level = level;
        self
    }

    /// Set the rotation schedule.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Console only, no files.
    #[must_use]
    pub const fn without_file_logging(mut self) -> Self {
        self.file_logging = false;
        self
    }

    fn console_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| marquee_filter(Level::WARN, self.console_level))
    }

    fn file_filter(&self) -> EnvFilter {
        marquee_filter(Level::INFO, self.file_level)
    }

    fn span_events(&self) -> FmtSpan {
        if self.log_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// `base` for dependencies, `ours` for Marquee targets.
fn marquee_filter(base: Level, ours: Level) -> EnvFilter {
    MARQUEE_TARGETS
        .iter()
        .filter_map(|target| format!("{target}={}", level_name(ours)).parse::<Directive>().ok())
        .fold(EnvFilter::new(level_name(base)), EnvFilter::add_directive)
}

/// Keeps the file writer alive. Dropping it flushes pending lines.
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log directory or file appender cannot be set up,
/// or if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let console_layer = fmt::layer()
        .with_ansi(config.console_ansi)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_span_events(config.span_events())
        .with_filter(config.console_filter());

    let (file_layer, file_guard) = if config.file_logging {
        let appender = file_appender(config)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(config.span_events())
            .json()
            .with_filter(config.file_filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        "Logging initialized (console {}, file {})",
        config.console_level,
        if config.file_logging {
            level_name(config.file_level)
        } else {
            "off"
        }
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// [`init`] with [`LoggingConfig::auto`].
///
/// # Errors
///
/// Same as [`init`].
pub fn init_auto() -> Result<LoggingGuard, LoggingError> {
    init(&LoggingConfig::auto())
}

fn file_appender(config: &LoggingConfig) -> Result<RollingFileAppender, LoggingError> {
    if !config.log_directory.exists() {
        std::fs::create_dir_all(&config.log_directory).map_err(|e| {
            LoggingError::DirectoryCreationFailed {
                path: config.log_directory.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    let mut builder = RollingFileAppender::builder()
        .rotation(config.rotation.into())
        .filename_prefix(&config.log_file_prefix);
    if config.max_log_files > 0 {
        builder = builder.max_log_files(config.max_log_files);
    }

    builder
        .build(&config.log_directory)
        .map_err(|e| LoggingError::AppenderFailed(e.to_string()))
}

/// Default log directory under the platform data dir.
#[must_use]
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marquee")
        .join("logs")
}

const fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Errors raised while installing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("Failed to create log directory {path}: {reason}")]
    DirectoryCreationFailed {
        /// Directory path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The rolling file appender could not be built.
    #[error("Failed to open log file: {0}")]
    AppenderFailed(String),

    /// A global subscriber was already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_production() {
        let config = LoggingConfig::default();
        assert_eq!(config.console_level, Level::INFO);
        assert_eq!(config.max_log_files, 7);
        assert!(config.file_logging);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.file_level, Level::TRACE);
        assert_eq!(config.rotation, LogRotation::Hourly);
        assert!(config.log_span_events);
    }

    #[test]
    fn test_builder_setters() {
        let config = LoggingConfig::production()
            .with_console_level(Level::WARN)
            .with_log_file_prefix("marquee-api")
            .with_rotation(LogRotation::Never)
            .without_file_logging();

        assert_eq!(config.console_level, Level::WARN);
        assert_eq!(config.log_file_prefix, "marquee-api");
        assert_eq!(config.rotation, LogRotation::Never);
        assert!(!config.file_logging);
    }

    #[test]
    fn test_rotation_conversion() {
        assert!(matches!(Rotation::from(LogRotation::Daily), Rotation::DAILY));
        assert!(matches!(Rotation::from(LogRotation::Never), Rotation::NEVER));
    }

    #[test]
    fn test_filter_mentions_marquee_targets() {
        let filter = marquee_filter(Level::WARN, Level::DEBUG).to_string();
        assert!(filter.contains("marquee_core=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let dir = temp_dir.path().join("logs");
        let config = LoggingConfig::production().with_log_directory(dir.clone());

        file_appender(&config).expect("Should build appender");
        assert!(dir.is_dir());
    }

    #[test]
    fn test_default_log_directory() {
        let dir = default_log_directory();
        assert!(dir.ends_with("marquee/logs"));
    }
}
