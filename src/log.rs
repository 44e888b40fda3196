//! Append-only CSV session log.
//!
//! One row per fetch, written best-effort: the operator gets an audit trail, the
//! player never sees a failure. The file and its header are created on first write.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::LogError;
use crate::joke::Provenance;

/// Which shell is writing; decides the name of the last column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFlavor {
    Desktop,
    Web,
}

impl LogFlavor {
    pub fn header(&self) -> &'static str {
        match self {
            LogFlavor::Desktop => "timestamp,source,success,joke_len,chaos",
            LogFlavor::Web => "timestamp,source,success,joke_len,session_id",
        }
    }
}

/// Free-form last column.
#[derive(Clone, Debug, PartialEq)]
pub enum LogContext {
    Chaos(f64),
    Session(String),
}

impl LogContext {
    fn render(&self) -> String {
        match self {
            LogContext::Chaos(p) => p.to_string(),
            LogContext::Session(id) => id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub source: Provenance,
    pub success: bool,
    pub joke_len: usize,
    pub extra: LogContext,
}

impl LogRecord {
    /// Stamps the record with the current UTC time.
    pub fn now(source: Provenance, success: bool, joke_len: usize, extra: LogContext) -> Self {
        Self { timestamp: Utc::now(), source, success, joke_len, extra }
    }

    fn to_csv_line(&self) -> String {
        let fields = [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.source.as_str().to_owned(),
            self.success.to_string(),
            self.joke_len.to_string(),
            self.extra.render(),
        ];
        let escaped: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        escaped.join(",")
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// Process-wide session log. Appends are serialized so repeated key presses
/// can't interleave partial rows.
#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
    flavor: LogFlavor,
    lock: Mutex<()>,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>, flavor: LogFlavor) -> Self {
        Self { path: path.into(), flavor, lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flavor(&self) -> LogFlavor {
        self.flavor
    }

    /// Never fails; errors are reported through tracing and dropped.
    pub fn record(&self, record: &LogRecord) {
        if let Err(err) = self.try_record(record) {
            tracing::warn!(path = %self.path.display(), error = %err, "session log write skipped");
        }
    }

    pub fn try_record(&self, record: &LogRecord) -> Result<(), LogError> {
        // a poisoned lock only means an earlier writer panicked; the file is still usable
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let header_needed = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut buf = String::new();
        if header_needed {
            buf.push_str(self.flavor.header());
            buf.push('\n');
        }
        buf.push_str(&record.to_csv_line());
        buf.push('\n');
        file.write_all(buf.as_bytes())?;
        Ok(())
    }
}

/// Anything a fetch can report its outcome to.
pub trait LogSink {
    fn record(&self, record: &LogRecord);
}

impl LogSink for SessionLog {
    fn record(&self, record: &LogRecord) {
        SessionLog::record(self, record)
    }
}

/// Log kept in memory for hosts without a filesystem (the browser build). The host
/// drains new lines and persists them wherever it keeps the session log.
#[derive(Debug)]
pub struct MemoryLog {
    flavor: LogFlavor,
    rows: Mutex<Vec<String>>,
    drained: usize,
}

impl MemoryLog {
    pub fn new(flavor: LogFlavor) -> Self {
        Self { flavor, rows: Mutex::new(Vec::new()), drained: 0 }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whole log as CSV, header first. Empty until the first row.
    pub fn contents(&self) -> String {
        let rows = self.rows.lock().unwrap_or_else(|p| p.into_inner());
        if rows.is_empty() {
            return String::new();
        }
        let mut out = String::from(self.flavor.header());
        out.push('\n');
        for row in rows.iter() {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    /// Lines added since the previous drain. The first non-empty drain starts with
    /// the header, so appending every drain to one file yields a valid log.
    pub fn drain(&mut self) -> String {
        let rows = self.rows.get_mut().unwrap_or_else(|p| p.into_inner());
        let mut out = String::new();
        if self.drained == 0 && !rows.is_empty() {
            out.push_str(self.flavor.header());
            out.push('\n');
        }
        for row in &rows[self.drained..] {
            out.push_str(row);
            out.push('\n');
        }
        self.drained = rows.len();
        out
    }
}

impl LogSink for MemoryLog {
    fn record(&self, record: &LogRecord) {
        self.rows.lock().unwrap_or_else(|p| p.into_inner()).push(record.to_csv_line());
    }
}
