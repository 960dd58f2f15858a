//! Console and file logger.
//!
//! This module implements the [`log`] crate's logging facade, writing log
//! messages to the console and, optionally, to a file next to the robot's
//! other run artifacts.
//!
//! # Usage
//!
//! Initialize the logger once at the start of your program:
//!
//! ```ignore
//! use chaser::fs::logger;
//! use log::{info, LevelFilter};
//!
//! logger::init(LevelFilter::Debug, Some("chase.log")).expect("Logger init failed");
//! info!("Program started");
//! ```
//!
//! # Log Output
//!
//! Each entry carries the level, the time since the logger was initialized,
//! the target (module path) and the message:
//!
//! ```text
//! INFO [2m 5s 123ms] chaser::tracking::state - Target lost for 15 ticks, searching Left
//! WARN [2m 5s 456ms] chaser::controller - Emergency stop engaged
//! ```

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use humantime::format_duration;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// A dual-output logger.
///
/// Writes log messages to the console and, when a path was given and could
/// be opened, to a file. The file is truncated on initialization.
pub struct ChaseLogger {
    started:     Instant,
    /// `None` when no file was requested or it could not be opened.
    file_writer: Mutex<Option<BufWriter<std::fs::File>>>,
}

impl ChaseLogger {
    fn new(path: Option<&Path>) -> Self {
        let file_writer = path.and_then(|p| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(p)
                .ok()
                .map(BufWriter::new)
        });

        Self {
            started:     Instant::now(),
            file_writer: Mutex::new(file_writer),
        }
    }

    /// Whether log lines are also going to a file.
    pub fn has_file(&self) -> bool { self.file_writer.lock().map(|w| w.is_some()).unwrap_or(false) }
}

impl log::Log for ChaseLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_line = format_line(
                record.level(),
                self.started.elapsed(),
                record.target(),
                &record.args().to_string(),
            );

            print!("{}", log_line);

            if let Ok(mut writer_guard) = self.file_writer.lock() {
                if let Some(ref mut writer) = *writer_guard {
                    let _ = writer.write_all(log_line.as_bytes());
                }
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut writer_guard) = self.file_writer.lock() {
            if let Some(ref mut writer) = *writer_guard {
                let _ = writer.flush();
            }
        }
    }
}

static LOGGER: OnceLock<ChaseLogger> = OnceLock::new();

/// Initializes the global logger.
///
/// # Arguments
///
/// * `level` - The minimum log level to record.
/// * `path` - Optional log file. If it cannot be opened, logging continues on
///   the console only.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init(level: LevelFilter, path: Option<impl AsRef<Path>>) -> Result<(), SetLoggerError> {
    let path: Option<&Path> = path.as_ref().map(|p| p.as_ref());
    let logger = LOGGER.get_or_init(|| ChaseLogger::new(path));
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

/// Formats one log line, newline included.
fn format_line(level: log::Level, uptime: Duration, target: &str, message: &str) -> String {
    // millisecond resolution keeps lines short
    let uptime = Duration::from_millis(uptime.as_millis() as u64);
    format!("{} [{}] {} - {}\n", level, format_duration(uptime), target, message)
}
