//! Rolling Logger
//!
//! A `tracing` subscriber that writes to a size-rotated file and keeps the
//! most recent lines in memory. `log` records are bridged through
//! `tracing-log`, so crates using either facade end up in the same file.
//!
//! Files are named `<app>.log`, `<app>.1.log`, ... with `.1` the newest
//! rotated file.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_BUFFER_LINES: usize = 500;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid log level '{0}'")]
    Level(String),
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
}

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub dir: PathBuf,
    pub app_name: String,
    pub max_file_bytes: u64,
    pub max_files: usize,
    pub buffer_lines: usize,
    pub level: LevelFilter,
    /// Also print to stderr
    pub echo_stderr: bool,
}

impl LoggerOptions {
    pub fn new(dir: impl Into<PathBuf>, app_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            app_name: app_name.into(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files: DEFAULT_MAX_FILES,
            buffer_lines: DEFAULT_BUFFER_LINES,
            level: LevelFilter::INFO,
            echo_stderr: false,
        }
    }

    /// Parse a level name such as "debug"
    pub fn with_level(mut self, level: &str) -> Result<Self, LoggerError> {
        self.level = level
            .trim()
            .parse()
            .map_err(|_| LoggerError::Level(level.to_string()))?;
        Ok(self)
    }

    pub fn with_stderr(mut self, echo: bool) -> Self {
        self.echo_stderr = echo;
        self
    }
}

struct Inner {
    dir: PathBuf,
    app_name: String,
    max_file_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
    recent: VecDeque<String>,
    buffer_lines: usize,
    partial: String,
}

impl Inner {
    fn path(&self, index: usize) -> PathBuf {
        rotated_path(&self.dir, &self.app_name, index)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let oldest = self.path(self.max_files.saturating_sub(1));
        if self.max_files > 1 && oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files.saturating_sub(1)).rev() {
            let from = self.path(index);
            if from.exists() {
                fs::rename(&from, self.path(index + 1))?;
            }
        }
        if self.max_files > 1 {
            fs::rename(self.path(0), self.path(1))?;
        }
        self.file = File::create(self.path(0))?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(end) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=end).collect();
            if self.recent.len() == self.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }
}

fn rotated_path(dir: &Path, app_name: &str, index: usize) -> PathBuf {
    if index == 0 {
        dir.join(format!("{}.log", app_name))
    } else {
        dir.join(format!("{}.{}.log", app_name, index))
    }
}

/// Shared handle to the rotating file and line buffer
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<Inner>>,
}

impl RollingWriter {
    pub fn open(options: &LoggerOptions) -> Result<Self, LoggerError> {
        fs::create_dir_all(&options.dir)?;
        let path = rotated_path(&options.dir, &options.app_name, 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                dir: options.dir.clone(),
                app_name: options.app_name.clone(),
                max_file_bytes: options.max_file_bytes,
                max_files: options.max_files.max(1),
                file,
                written,
                recent: VecDeque::with_capacity(options.buffer_lines),
                buffer_lines: options.buffer_lines.max(1),
                partial: String::new(),
            })),
        })
    }

    /// Lines written since startup, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner.recent.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.inner.lock().ok().map(|inner| inner.path(0))
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        if inner.written > 0 && inner.written + buf.len() as u64 > inner.max_file_bytes {
            inner.rotate()?;
        }
        inner.file.write_all(buf)?;
        inner.written += buf.len() as u64;
        inner.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        inner.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static WRITER: OnceLock<RollingWriter> = OnceLock::new();

/// Install the global logger with default options
pub fn init_logger(dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_with(LoggerOptions::new(dir, app_name))
}

pub fn init_with(options: LoggerOptions) -> Result<(), LoggerError> {
    if WRITER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let writer = RollingWriter::open(&options)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer.clone());
    let stderr_layer = options
        .echo_stderr
        .then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(options.level)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    WRITER
        .set(writer)
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    tracing::info!("logger started for {} in {}", options.app_name, options.dir.display());
    Ok(())
}

fn ensure_initialized() -> Result<(), LoggerError> {
    WRITER.get().map(|_| ()).ok_or(LoggerError::NotInitialized)
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn warn(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::warn!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", message);
    Ok(())
}

/// Recent lines from the global logger; empty before init
pub fn recent_lines() -> Vec<String> {
    WRITER.get().map(RollingWriter::recent_lines).unwrap_or_default()
}
