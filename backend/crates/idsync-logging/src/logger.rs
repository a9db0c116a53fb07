use crate::{LoggingError, LoggingResult};

use idsync_config::LoggingConfig;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, info};

/// Where formatted lines are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `logging.file` inside `<config_dir>/<logging.dir>` when set, creating
    /// the directory; stdout otherwise
    pub fn from_config(logging: &LoggingConfig, config_dir: &Path) -> LoggingResult<Self> {
        let Some(filename) = logging.file.as_deref() else {
            return Ok(Self::Stdout);
        };

        let log_dir = config_dir.join(&logging.dir);
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| LoggingError::directory(log_dir.clone(), e))?;

        Ok(Self::File(log_dir.join(filename)))
    }
}

#[derive(Debug, Clone)]
pub struct LoggerSettings {
    pub level: LevelFilter,
    pub target: LogTarget,
    /// Ignored for file targets
    pub colored: bool,
}

impl LoggerSettings {
    pub fn new(level: LevelFilter, target: LogTarget, colored: bool) -> Self {
        Self {
            level,
            target,
            colored,
        }
    }
}

/// `[<rfc3339> - LEVEL] message [file:line]`
pub fn render_line(
    at: SystemTime,
    level: impl Display,
    message: impl Display,
    file: Option<&str>,
    line: Option<u32>,
) -> String {
    format!(
        "[{} - {}] {} [{}:{}]",
        humantime::format_rfc3339(at),
        level,
        message,
        file.unwrap_or("unknown"),
        line.unwrap_or(0)
    )
}

fn level_colors() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
}

/// Build the dispatch without installing it. Opens the log file for file
/// targets.
pub fn build_dispatch(settings: &LoggerSettings) -> LoggingResult<Dispatch> {
    let colored = settings.colored && !matches!(settings.target, LogTarget::File(_));
    let colors = level_colors();

    // sqlx logs every statement at info
    let dispatch = Dispatch::new()
        .level(settings.level)
        .level_for("sqlx", LevelFilter::Warn)
        .format(move |out, message, record| {
            let rendered = if colored {
                render_line(
                    SystemTime::now(),
                    colors.color(record.level()),
                    message,
                    record.file(),
                    record.line(),
                )
            } else {
                render_line(
                    SystemTime::now(),
                    record.level(),
                    message,
                    record.file(),
                    record.line(),
                )
            };
            out.finish(format_args!("{}", rendered))
        });

    let dispatch = match &settings.target {
        LogTarget::Stdout => dispatch.chain(std::io::stdout()),
        LogTarget::Stderr => dispatch.chain(std::io::stderr()),
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| LoggingError::file(path.clone(), e))?;
            dispatch.chain(file)
        }
    };

    Ok(dispatch)
}

/// Install the global logger. Call once, before anything logs.
#[track_caller]
pub fn initialize(settings: &LoggerSettings) -> LoggingResult<()> {
    build_dispatch(settings)?
        .apply()
        .map_err(|e| LoggingError::install(e.to_string()))?;

    match &settings.target {
        LogTarget::File(path) => info!(
            "Logger initialized: level={:?}, file={}",
            settings.level,
            path.display()
        ),
        target => info!("Logger initialized: level={:?}, {:?}", settings.level, target),
    }

    // Bridge tracing to log
    tracing_log::LogTracer::init().ok();

    Ok(())
}
