//! Structured logging for the picker subsystem.
//!
//! The controller runs inside a host application that usually has its own
//! notification surface, so the logger supports an optional external sink in
//! addition to a plain console default. Records carry a category (e.g.
//! `"poll"`, `"inject"`) and an optional JSON auxiliary payload.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Verbosity;

/// Convenience alias for external logging callbacks.
pub type LogCallback = Arc<dyn Fn(&PickerLogRecord) + Send + Sync + 'static>;

/// Log severity used across the picker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Info = 1,
    Debug = 2,
}

impl LogLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

fn verbosity_to_u8(verbose: Verbosity) -> u8 {
    match verbose {
        Verbosity::Minimal => 0,
        Verbosity::Medium => 1,
        Verbosity::Detailed => 2,
    }
}

/// Structured log entry shared with external callbacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickerLogRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Value>,
}

impl PickerLogRecord {
    pub fn new(
        message: impl Into<String>,
        level: LogLevel,
        category: Option<String>,
        auxiliary: Option<Value>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            level,
            category,
            auxiliary,
        }
    }
}

/// Default console printer used when no external sink is configured.
pub fn default_log_handler(record: &PickerLogRecord) {
    let timestamp = record
        .timestamp
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    if let Some(category) = &record.category {
        println!(
            "[{}] {:<5} [{}] {}",
            timestamp,
            record.level.label(),
            category,
            record.message
        );
    } else {
        println!(
            "[{}] {:<5} {}",
            timestamp,
            record.level.label(),
            record.message
        );
    }
    if let Some(aux) = &record.auxiliary {
        if !aux.is_null() {
            println!("    {}", aux);
        }
    }
}

/// Verbosity-gated logger used by the picker controller.
pub struct PickerLogger {
    verbose: Verbosity,
    external: Option<LogCallback>,
    default_handler: LogCallback,
}

impl fmt::Debug for PickerLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerLogger")
            .field("verbosity", &self.verbose)
            .field("external", &self.external.is_some())
            .finish()
    }
}

impl PickerLogger {
    pub fn new(verbose: Verbosity) -> Self {
        Self {
            verbose,
            external: None,
            default_handler: Arc::new(default_log_handler),
        }
    }

    pub fn set_external_logger(&mut self, logger: Option<LogCallback>) {
        self.external = logger;
    }

    /// Errors are always emitted; info/debug are gated by verbosity.
    pub fn should_log(&self, level: LogLevel) -> bool {
        level == LogLevel::Error || level.as_u8() <= verbosity_to_u8(self.verbose)
    }

    pub fn log(
        &self,
        message: impl Into<String>,
        level: LogLevel,
        category: Option<&str>,
        auxiliary: Option<Value>,
    ) {
        if !self.should_log(level) {
            return;
        }

        let record =
            PickerLogRecord::new(message, level, category.map(|c| c.to_string()), auxiliary);

        if let Some(callback) = &self.external {
            callback(&record);
        } else {
            (self.default_handler)(&record);
        }
    }

    pub fn error(
        &self,
        message: impl Into<String>,
        category: Option<&str>,
        auxiliary: Option<Value>,
    ) {
        self.log(message, LogLevel::Error, category, auxiliary);
    }

    pub fn info(
        &self,
        message: impl Into<String>,
        category: Option<&str>,
        auxiliary: Option<Value>,
    ) {
        self.log(message, LogLevel::Info, category, auxiliary);
    }

    pub fn debug(
        &self,
        message: impl Into<String>,
        category: Option<&str>,
        auxiliary: Option<Value>,
    ) {
        self.log(message, LogLevel::Debug, category, auxiliary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn respects_verbosity() {
        let logger = PickerLogger::new(Verbosity::Minimal);
        assert!(logger.should_log(LogLevel::Error));
        assert!(!logger.should_log(LogLevel::Debug));

        let logger = PickerLogger::new(Verbosity::Detailed);
        assert!(logger.should_log(LogLevel::Debug));
    }

    #[test]
    fn external_logger_is_invoked() {
        let records = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&records);
        let callback: LogCallback = Arc::new(move |record| {
            capture.lock().unwrap().push(record.clone());
        });

        let mut logger = PickerLogger::new(Verbosity::Detailed);
        logger.set_external_logger(Some(callback));

        logger.info("hello", Some("test"), None);

        let values = records.lock().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].message, "hello");
        assert_eq!(values[0].category.as_deref(), Some("test"));
        assert_eq!(values[0].level, LogLevel::Info);
    }

    #[test]
    fn gated_records_never_reach_the_sink() {
        let records = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&records);
        let callback: LogCallback = Arc::new(move |record| {
            capture.lock().unwrap().push(record.clone());
        });

        let mut logger = PickerLogger::new(Verbosity::Minimal);
        logger.set_external_logger(Some(callback));

        logger.debug("quiet", Some("poll"), None);
        logger.error("loud", Some("poll"), None);

        let values = records.lock().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].message, "loud");
    }
}
