//! Per-component logging for AnalystAI.
//!
//! Every logical component gets one named [`Logger`] with two sinks attached
//! at construction: stdout and a size-rotating file at `<log_dir>/<name>.log`.
//! The [`LoggerRegistry`] caches handles per name, so looking a logger up
//! twice never attaches sinks twice (which would duplicate every line).
//!
//! Both sinks share one line format:
//!
//! ```text
//! 07-08-2026 14:03:21 +0000 | INFO     | server | AnalystAI 0.0.1 starting
//! ```
//!
//! The registry is an owned value built from [`Settings`], not a process
//! global; tests construct isolated registries against temp directories.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use thiserror::Error;

use crate::config::Settings;

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S %z";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("logger name must not be empty")]
    EmptyName,

    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Append-only writer that rotates the file when the next record would push
/// it past `max_bytes`.
///
/// Rotation shifts `<file>.N` to `<file>.N+1` for N descending, renames the
/// active file to `<file>.1`, and reopens a fresh one. At most `backup_count`
/// rotated files are kept; the oldest is removed first. `max_bytes == 0`
/// disables rotation.
#[derive(Debug)]
struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    len: u64,
}

impl RotatingFileWriter {
    fn open(path: PathBuf, max_bytes: u64, backup_count: usize) -> std::io::Result<Self> {
        let file = open_append(&path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            len,
        })
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        let record_len = line.len() as u64 + 1;
        if self.max_bytes > 0 && self.len > 0 && self.len + record_len > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.len += record_len;
        Ok(())
    }

    fn rotate(&mut self) -> std::io::Result<()> {
        if self.backup_count > 0 {
            let oldest = backup_path(&self.path, self.backup_count);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backup_count).rev() {
                let from = backup_path(&self.path, index);
                if from.exists() {
                    fs::rename(&from, backup_path(&self.path, index + 1))?;
                }
            }
            fs::rename(&self.path, backup_path(&self.path, 1))?;
        } else {
            fs::remove_file(&self.path)?;
        }
        self.file = open_append(&self.path)?;
        self.len = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut buf = path.as_os_str().to_owned();
    buf.push(format!(".{}", index));
    PathBuf::from(buf)
}

/// A named logger with a console sink and a size-rotating file sink.
///
/// Handles are created through [`LoggerRegistry::get_logger`] and shared via
/// `Arc`; the registry guarantees both sinks are attached exactly once per
/// name for the process lifetime.
#[derive(Debug)]
pub struct Logger {
    name: String,
    level: Level,
    file: Mutex<RotatingFileWriter>,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum severity this logger emits, fixed at first registration.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Emit `message` at `level` through both sinks.
    ///
    /// Messages below the logger's configured level are dropped. Each
    /// accepted message produces exactly one stdout line and one file line;
    /// file writes are serialized so concurrent callers never interleave
    /// within a line. A file write failure is reported on the tracing
    /// channel rather than failing the caller.
    pub fn log(&self, level: Level, message: &str) {
        if level < self.level {
            return;
        }

        let line = format!(
            "{} | {:<8} | {} | {}",
            Local::now().format(TIMESTAMP_FORMAT),
            level.as_str(),
            self.name,
            message
        );

        println!("{}", line);

        let mut writer = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writer.write_line(&line) {
            tracing::error!("log file write failed for {}: {}", self.name, err);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn critical(&self, message: &str) {
        self.log(Level::Critical, message);
    }
}

/// Creates and caches one [`Logger`] per component name.
#[derive(Debug)]
pub struct LoggerRegistry {
    log_dir: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    /// Build a registry from the application settings.
    pub fn new(settings: &Settings) -> Self {
        Self::with_options(
            settings.log_dir.clone(),
            settings.log_max_bytes,
            settings.log_backup_count,
        )
    }

    /// Build a registry with explicit options (useful for testing).
    pub fn with_options(log_dir: PathBuf, max_bytes: u64, backup_count: usize) -> Self {
        Self {
            log_dir,
            max_bytes,
            backup_count,
            loggers: Mutex::new(HashMap::new()),
        }
    }

    /// Return the logger registered under `name`, creating it on first use.
    ///
    /// A cache hit returns the existing handle unconditionally: the `level`
    /// argument is ignored and the first registration wins. Callers wanting
    /// a different severity for an existing name get the original handle,
    /// not a reconfigured one.
    ///
    /// On first use the log directory is created if missing (parents
    /// included) and the file sink is opened for append.
    ///
    /// # Errors
    ///
    /// Returns `LogError::EmptyName` for an empty name, and the underlying
    /// I/O error if the directory cannot be created or the log file cannot
    /// be opened. I/O failures are not downgraded; a logger without its
    /// file sink would silently lose operational data.
    pub fn get_logger(&self, name: &str, level: Level) -> Result<Arc<Logger>, LogError> {
        if name.is_empty() {
            return Err(LogError::EmptyName);
        }

        // Construction happens while the map lock is held so concurrent
        // first lookups cannot attach sinks twice.
        let mut loggers = self.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = loggers.get(name) {
            return Ok(Arc::clone(logger));
        }

        fs::create_dir_all(&self.log_dir).map_err(|source| LogError::CreateDir {
            path: self.log_dir.clone(),
            source,
        })?;

        let path = self.log_dir.join(format!("{}.log", name));
        let writer = RotatingFileWriter::open(path.clone(), self.max_bytes, self.backup_count)
            .map_err(|source| LogError::OpenFile { path, source })?;

        let logger = Arc::new(Logger {
            name: name.to_string(),
            level,
            file: Mutex::new(writer),
        });
        loggers.insert(name.to_string(), Arc::clone(&logger));
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::thread;
    use tempfile::tempdir;

    fn registry(dir: &Path, max_bytes: u64, backup_count: usize) -> LoggerRegistry {
        LoggerRegistry::with_options(dir.to_path_buf(), max_bytes, backup_count)
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn repeated_lookups_share_one_handle() {
        let dir = tempdir().expect("tempdir");
        let registry = registry(dir.path(), 0, 0);

        let first = registry.get_logger("worker", Level::Info).expect("logger");
        let second = registry.get_logger("worker", Level::Error).expect("logger");

        assert!(Arc::ptr_eq(&first, &second));
        // First registration wins; the later level request is ignored.
        assert_eq!(second.level(), Level::Info);

        let third = registry.get_logger("worker", Level::Debug).expect("logger");
        assert_eq!(third.level(), Level::Info);
    }

    #[test]
    fn empty_name_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let registry = registry(dir.path(), 0, 0);

        let err = registry
            .get_logger("", Level::Info)
            .expect_err("empty name should fail");
        assert!(matches!(err, LogError::EmptyName));
    }

    #[test]
    fn creates_missing_log_directory() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("var").join("log").join("analyst");
        let registry = registry(&nested, 0, 0);

        registry.get_logger("boot", Level::Info).expect("logger");
        assert!(nested.is_dir());

        // Second creation with the directory already present.
        registry.get_logger("again", Level::Info).expect("logger");
    }

    #[test]
    fn emits_one_line_per_message() {
        let dir = tempdir().expect("tempdir");
        let registry = registry(dir.path(), 0, 0);

        let first = registry.get_logger("single", Level::Info).expect("logger");
        let second = registry.get_logger("single", Level::Info).expect("logger");
        first.info("only once");

        let lines = read_lines(&dir.path().join("single.log"));
        assert_eq!(lines.len(), 1);

        second.info("and once more");
        let lines = read_lines(&dir.path().join("single.log"));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn line_format_is_pipe_delimited() {
        let dir = tempdir().expect("tempdir");
        let registry = registry(dir.path(), 0, 0);

        let logger = registry
            .get_logger("pipeline", Level::Debug)
            .expect("logger");
        logger.warning("ingest started");

        let lines = read_lines(&dir.path().join("pipeline.log"));
        assert_eq!(lines.len(), 1);

        let fields: Vec<&str> = lines[0].splitn(4, " | ").collect();
        assert_eq!(fields.len(), 4);
        DateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT).expect("timestamp parses");
        assert_eq!(fields[1], "WARNING ");
        assert_eq!(fields[2], "pipeline");
        assert_eq!(fields[3], "ingest started");
    }

    #[test]
    fn messages_below_level_are_dropped() {
        let dir = tempdir().expect("tempdir");
        let registry = registry(dir.path(), 0, 0);

        let logger = registry.get_logger("quiet", Level::Warning).expect("logger");
        logger.debug("not emitted");
        logger.info("not emitted either");

        let path = dir.path().join("quiet.log");
        assert_eq!(read_lines(&path).len(), 0);

        logger.error("emitted");
        logger.critical("also emitted");
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn rotation_respects_backup_count() {
        let dir = tempdir().expect("tempdir");
        // Lines are ~58 bytes, so roughly two fit per file.
        let registry = registry(dir.path(), 150, 2);

        let logger = registry.get_logger("rotor", Level::Info).expect("logger");
        for i in 0..12 {
            logger.info(&format!("message-{:02}", i));
        }

        let active = dir.path().join("rotor.log");
        let backup_1 = dir.path().join("rotor.log.1");
        let backup_2 = dir.path().join("rotor.log.2");
        let backup_3 = dir.path().join("rotor.log.3");

        assert!(active.exists());
        assert!(backup_1.exists());
        assert!(backup_2.exists());
        assert!(!backup_3.exists());

        for path in [&active, &backup_1, &backup_2] {
            let len = fs::metadata(path).expect("metadata").len();
            assert!(len <= 150, "{} exceeds rotation threshold", path.display());
        }

        // Oldest messages fell off the end of the backup chain.
        let mut retained = String::new();
        for path in [&active, &backup_1, &backup_2] {
            retained.push_str(&fs::read_to_string(path).expect("read log"));
        }
        assert!(!retained.contains("message-00"));
        assert!(retained.contains("message-11"));

        // Newest message is in the active file.
        assert!(fs::read_to_string(&active)
            .expect("read log")
            .contains("message-11"));
    }

    #[test]
    fn zero_threshold_disables_rotation() {
        let dir = tempdir().expect("tempdir");
        let registry = registry(dir.path(), 0, 3);

        let logger = registry.get_logger("flat", Level::Info).expect("logger");
        for i in 0..50 {
            logger.info(&format!("entry {}", i));
        }

        assert_eq!(read_lines(&dir.path().join("flat.log")).len(), 50);
        assert!(!dir.path().join("flat.log.1").exists());
    }

    #[test]
    fn concurrent_first_use_attaches_sinks_once() {
        let dir = tempdir().expect("tempdir");
        let registry = registry(dir.path(), 0, 0);

        let handles: Vec<Arc<Logger>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.get_logger("shared", Level::Info)))
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().expect("thread").expect("logger"))
                .collect()
        });

        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], handle));
        }

        handles[0].info("solo");
        let lines = read_lines(&dir.path().join("shared.log"));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn registries_are_isolated() {
        let dir_a = tempdir().expect("tempdir");
        let dir_b = tempdir().expect("tempdir");
        let registry_a = registry(dir_a.path(), 0, 0);
        let registry_b = registry(dir_b.path(), 0, 0);

        let logger_a = registry_a.get_logger("dup", Level::Info).expect("logger");
        let logger_b = registry_b.get_logger("dup", Level::Info).expect("logger");

        assert!(!Arc::ptr_eq(&logger_a, &logger_b));

        logger_a.info("from a");
        assert_eq!(read_lines(&dir_a.path().join("dup.log")).len(), 1);
        assert_eq!(read_lines(&dir_b.path().join("dup.log")).len(), 0);
    }
}
