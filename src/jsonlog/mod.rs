//! Line-oriented JSON logger.
//!
//! One object per line:
//! `{"level":"INFO","time":"...","message":"...","properties":{...},"trace":"..."}`.
//! The logger is constructed once at startup and cloned wherever it is
//! needed; clones share the sink, and a mutex keeps concurrent lines whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

pub type Properties = BTreeMap<String, String>;

/// Build a `Properties` map from string pairs.
pub fn properties<const N: usize>(pairs: [(&str, &str); N]) -> Properties {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Error,
    Fatal,
    Off,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Level::Info),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "off" => Ok(Level::Off),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    level: Level,
    time: DateTime<Utc>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<String>,
}

type Sink = Box<dyn Write + Send>;

#[derive(Clone)]
pub struct Logger {
    out: Arc<Mutex<Sink>>,
    min_level: Level,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("min_level", &self.min_level).finish()
    }
}

impl Logger {
    pub fn new(out: impl Write + Send + 'static, min_level: Level) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            min_level,
        }
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn print_info(&self, message: &str, properties: Option<&Properties>) {
        let _ = self.print(Level::Info, message, properties);
    }

    pub fn print_error(&self, err: &dyn std::error::Error, properties: Option<&Properties>) {
        let _ = self.print(Level::Error, &err.to_string(), properties);
    }

    /// Log at FATAL and exit the process with status 1.
    pub fn print_fatal(&self, err: &dyn std::error::Error, properties: Option<&Properties>) -> ! {
        let _ = self.print(Level::Fatal, &err.to_string(), properties);
        std::process::exit(1)
    }

    fn print(&self, level: Level, message: &str, properties: Option<&Properties>) -> io::Result<usize> {
        if level < self.min_level {
            return Ok(0);
        }

        let entry = Entry {
            level,
            time: Utc::now(),
            message,
            properties,
            trace: (level >= Level::Error).then(|| Backtrace::force_capture().to_string()),
        };

        let mut line = match serde_json::to_vec(&entry) {
            Ok(line) => line,
            Err(err) => format!("ERROR: unable to marshal log message: {}", err).into_bytes(),
        };
        line.push(b'\n');

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(&line)?;
        out.flush()?;
        Ok(line.len())
    }
}

/// Raw writes (e.g. from the tracing subscriber) become INFO entries.
impl Write for Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let message = String::from_utf8_lossy(buf);
        self.print(Level::Info, message.trim_end(), None)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Logger {
    type Writer = Logger;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
