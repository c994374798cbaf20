//! Pipeline log broadcasting.
//!
//! Every assembly step reports through the helpers below. Entries are echoed
//! to stdout and fanned out to any client listening on `GET /api/logs`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entries buffered per slow subscriber before it starts lagging.
pub const LOG_CHANNEL_CAPACITY: usize = 256;

/// Log level for frontend display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth (per-file lines sit under their step).
    #[serde(default)]
    pub indent: u8,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    fn to_line(&self) -> String {
        format!("{}{} {}", "   ".repeat(self.indent as usize), self.level.prefix(), self.message)
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans log entries out to every subscriber.
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn log(&self, entry: LogEntry) {
        println!("{}", entry.to_line());
        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Success, "Loaded 2 sheet(s)"));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Success);
        assert_eq!(entry.message, "Loaded 2 sheet(s)");
    }

    #[test]
    fn test_log_without_subscribers() {
        LogBroadcaster::new().log(LogEntry::new(LogLevel::Info, "nobody listening"));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry::new(LogLevel::Warning, "skipped").with_indent(1);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["level"], "warning");
        assert_eq!(json["message"], "skipped");
        assert_eq!(json["indent"], 1);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_line_indentation() {
        let entry = LogEntry::new(LogLevel::Info, "a.csv").with_indent(2);
        assert_eq!(entry.to_line(), "          a.csv");
    }
}
