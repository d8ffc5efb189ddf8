//! Installs the global `tracing` subscriber for Strata binaries.
//!
//! Libraries only emit events. The `strata` CLI calls
//! `Logger::builder().name(..).verbosity(count).init()` once at startup; `RUST_LOG`
//! still overrides the level picked from `-v`.
//!
//! ```rust
//! let _logger = strata_logger::Logger::builder().name("strata").verbosity(1).init().unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    #[cfg(feature = "json")]
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            #[cfg(feature = "json")]
            json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: std::marker::PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder {
            name: WithName(name.into()),
            config: self.config,
            file_state: std::marker::PhantomData,
        }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    #[must_use]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    #[must_use]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes file output as JSON lines.
    #[cfg(feature = "json")]
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Maps a repeated `-v` flag count onto a level: 0 warn, 1 info, 2 debug, 3+ trace.
    #[must_use]
    pub const fn verbosity(self, count: u8) -> Self {
        let level = match count {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        self.level(level)
    }

    /// Directive string such as `strata_defaults=debug`; replaces `RUST_LOG`.
    #[must_use]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Stderr output, on by default.
    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Also write rolling files into `path`.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: std::marker::PhantomData }
    }

    /// Installs the subscriber. Keep the returned [`Logger`] alive so file output flushes.
    ///
    /// # Errors
    /// [`LoggerError::Subscriber`] on a second call, [`LoggerError::InvalidConfiguration`]
    /// for a blank name, zero `max_files`, a bad filter or no enabled output.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { config, name: WithName(name), .. } = self;
        validate_config(&config, &name)?;
        let filter = build_env_filter(&config)?;

        let console = config
            .console
            .then(|| layer().compact().with_writer(std::io::stderr).with_ansi(true).boxed());
        let (file, guard) = match &config.path {
            Some(dir) => {
                let (file, guard) = file_layer(&config, &name, dir)?;
                (Some(file), Some(guard))
            },
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(console.into_iter().chain(file).collect::<Vec<_>>())
            .try_init()?;

        Ok(Logger { guard })
    }
}

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

fn file_layer(
    config: &LoggerConfig,
    name: &str,
    dir: &Path,
) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(dir).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Log directory {}", dir.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(config.max_files)
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let plain = layer().with_writer(writer).with_ansi(false);

    #[cfg(feature = "json")]
    let boxed = if config.json { plain.json().boxed() } else { plain.boxed() };
    #[cfg(not(feature = "json"))]
    let boxed = plain.boxed();

    Ok((boxed, guard))
}

/// Owns the file writer's worker guard.
#[must_use = "file output stops when the handle drops"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig::default(),
            name: NoName,
            file_state: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Logging system shutting down, flushing buffers");
        }
    }
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if !config.console && config.path.is_none() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Neither console nor file output is enabled".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder().name("strata-test").env_filter("strata_defaults=debug");
        assert!(builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert_eq!(builder.config.env_filter.as_deref(), Some("strata_defaults=debug"));
        assert!(builder.config.path.is_none());
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(Logger::builder().name("v").verbosity(0).config.level, LevelFilter::WARN);
        assert_eq!(Logger::builder().name("v").verbosity(1).config.level, LevelFilter::INFO);
        assert_eq!(Logger::builder().name("v").verbosity(2).config.level, LevelFilter::DEBUG);
        assert_eq!(Logger::builder().name("v").verbosity(9).config.level, LevelFilter::TRACE);
    }

    #[test]
    fn file_configuration_is_recorded() {
        let tmp_dir = tempdir().expect("temp dir");
        let log_dir = tmp_dir.path().join("logs");
        let builder = Logger::builder()
            .name("strata-test")
            .path(log_dir.clone())
            .max_files(5)
            .level(LevelFilter::DEBUG);

        assert_eq!(builder.config.level, LevelFilter::DEBUG);
        assert_eq!(builder.config.max_files, 5);
        assert_eq!(builder.config.path.as_deref(), Some(log_dir.as_path()));
    }

    #[test]
    #[serial]
    fn blank_name_is_rejected() {
        let err = Logger::builder().name("   ").init().expect_err("blank name");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn no_layers_is_rejected() {
        let err = Logger::builder().name("quiet").console(false).init().expect_err("no layers");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn invalid_env_filter_is_rejected() {
        let err = Logger::builder()
            .name("strata-test")
            .env_filter("strata=notalevel")
            .init()
            .expect_err("invalid filter");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
