// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use derive_more::Display;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a captured log line, mirroring the client runtime's log types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LogSeverity {
    Log,
    Warning,
    Error,
    Assert,
    Exception,
}

/// A single captured log line. Created at capture time and never mutated;
/// dropped once submitted or evicted.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub message: String,
    pub severity: LogSeverity,
    pub captured_at: SystemTime,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, severity: LogSeverity) -> Self {
        LogEntry {
            message: message.into(),
            severity,
            captured_at: SystemTime::now(),
        }
    }

    /// Capture time as unix milliseconds. Clamps to 0 for clocks before the
    /// epoch rather than failing the capture path.
    pub fn timestamp_millis(&self) -> u128 {
        self.captured_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }

    /// Wire payload for the remote logging endpoint. Always carries at least
    /// `message`, `type` and `timestamp`.
    pub fn to_payload(&self) -> HashMap<String, String> {
        HashMap::from([
            ("message".to_string(), self.message.clone()),
            ("type".to_string(), self.severity.to_string()),
            ("timestamp".to_string(), self.timestamp_millis().to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_contains_required_fields() {
        let entry = LogEntry::new("boom", LogSeverity::Exception);
        let payload = entry.to_payload();

        assert_eq!(payload.get("message").map(String::as_str), Some("boom"));
        assert_eq!(payload.get("type").map(String::as_str), Some("Exception"));
        assert!(payload.contains_key("timestamp"));
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(LogSeverity::Log.to_string(), "Log");
        assert_eq!(LogSeverity::Warning.to_string(), "Warning");
        assert_eq!(LogSeverity::Error.to_string(), "Error");
    }

    #[test]
    fn test_timestamp_is_unix_millis() {
        let entry = LogEntry::new("tick", LogSeverity::Log);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis();
        let stamped = entry.timestamp_millis();
        assert!(stamped <= now && now - stamped < 5_000);
    }
}
