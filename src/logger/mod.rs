//! Level-filtered, timestamped logging.
//!
//! Formatting is a pure function over a [`LogRecord`]; the side-effecting
//! write lives behind the [`LogSink`] trait so the format can be tested
//! without capturing process output. The default sink writes synchronously
//! to the process streams: error and warn records to stderr, info and debug
//! records to stdout. There is no buffering, no asynchronous flushing and no
//! rotation.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::config::ConfigSnapshot;

/// Severity of a log record, ordered from most to least severe.
///
/// A record is emitted only if its level's rank is within the logger's
/// configured threshold rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Numeric rank: error=0, warn=1, info=2, debug=3.
    pub fn rank(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }

    /// The process stream this level is routed to.
    pub fn stream(self) -> OutputStream {
        match self {
            LogLevel::Error | LogLevel::Warn => OutputStream::Error,
            LogLevel::Info | LogLevel::Debug => OutputStream::Standard,
        }
    }
}

/// Destination stream for an emitted line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Standard,
    Error,
}

/// A single log entry. Produced, formatted and emitted immediately; never
/// retained.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub data: Option<Value>,
}

/// Render a record as `[<ISO-8601>] [<LEVEL>] <message>`, appending the
/// auxiliary data as compact JSON when present. Pure; performs no I/O.
pub fn format_record(record: &LogRecord) -> String {
    let timestamp = record
        .timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    match &record.data {
        Some(data) => format!("[{timestamp}] [{}] {} {data}", record.level, record.message),
        None => format!("[{timestamp}] [{}] {}", record.level, record.message),
    }
}

/// The side-effecting half of the logger: writes one formatted line to a
/// stream.
pub trait LogSink: Send + Sync {
    fn write_line(&self, stream: OutputStream, line: &str);
}

/// Default sink writing to the process stdout/stderr. Best-effort: a failed
/// write (e.g. a closed pipe) is ignored rather than taking the process down.
#[derive(Debug, Default)]
pub struct ProcessStreamSink;

impl LogSink for ProcessStreamSink {
    fn write_line(&self, stream: OutputStream, line: &str) {
        match stream {
            OutputStream::Standard => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{line}");
            }
            OutputStream::Error => {
                let mut err = io::stderr().lock();
                let _ = writeln!(err, "{line}");
            }
        }
    }
}

/// Sink that retains emitted lines in memory, for asserting on log output in
/// tests of this crate and of applications built on it.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(OutputStream, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines with their destination stream, in emission order.
    pub fn lines(&self) -> Vec<(OutputStream, String)> {
        self.lines.lock().expect("sink lock poisoned").clone()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, line)| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, stream: OutputStream, line: &str) {
        self.lines
            .lock()
            .expect("sink lock poisoned")
            .push((stream, line.to_string()));
    }
}

/// Level-filtered message emitter
///
/// The threshold is fixed at construction. Cloning is cheap; clones share
/// the same sink.
#[derive(Clone)]
pub struct Logger {
    threshold: LogLevel,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Logger with the given threshold, writing to the process streams.
    pub fn new(threshold: LogLevel) -> Self {
        Self::with_sink(threshold, Arc::new(ProcessStreamSink))
    }

    /// Logger with an explicit sink.
    pub fn with_sink(threshold: LogLevel, sink: Arc<dyn LogSink>) -> Self {
        Self { threshold, sink }
    }

    /// Logger whose threshold comes from the configuration snapshot.
    pub fn from_config(config: &ConfigSnapshot) -> Self {
        Self::new(config.log_level())
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// Emit a record at `level`, with optional auxiliary data. A no-op if
    /// `level` is outside the configured threshold.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, data: Option<Value>) {
        if level.rank() > self.threshold.rank() {
            return;
        }
        let record = LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data,
        };
        self.sink.write_line(level.stream(), &format_record(&record));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, None);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message, None);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message, None);
    }
}
