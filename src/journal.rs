//! In-memory journal of workbench activity.
//!
//! The journal records what the workbench did, one line per event, so a
//! session's dispatches, responses, and failures can be reviewed without
//! digging through full history entries. It is a bounded ring buffer
//! that drops its oldest events first and is never persisted.

use crate::config::get_config;
use crate::models::{ApiRequest, ApiResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Severity of a journal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine activity such as a dispatch or a successful response.
    Info,
    /// Something worth attention, such as a 4xx response or a retry.
    Warning,
    /// A failed exchange or an internal fault.
    Error,
}

impl LogLevel {
    /// Returns the lowercase name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single journal event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// When the event happened, in UTC.
    pub timestamp: DateTime<Utc>,

    /// Severity of the event.
    pub level: LogLevel,

    /// Human-readable description of what happened.
    pub message: String,

    /// Id of the request this event belongs to, when it relates to one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub request_id: Option<String>,
}

/// Bounded, newest-first record of workbench events.
#[derive(Debug, Clone)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    limit: usize,
}

impl Journal {
    /// Creates an empty journal sized from the global configuration.
    pub fn new() -> Self {
        Self::with_limit(get_config().journal_limit)
    }

    /// Creates an empty journal with an explicit capacity.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Appends an event, dropping the oldest if the journal is full.
    ///
    /// # Arguments
    ///
    /// * `level` - Severity of the event
    /// * `message` - Description of what happened
    /// * `request_id` - The request this event belongs to, if any
    pub fn push(&mut self, level: LogLevel, message: String, request_id: Option<String>) {
        self.entries.push_back(JournalEntry {
            timestamp: Utc::now(),
            level,
            message,
            request_id,
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Records that a request was handed to the dispatcher.
    pub fn log_dispatch(&mut self, request: &ApiRequest) {
        self.push(
            LogLevel::Info,
            format!("{} {}", request.method, request.url),
            Some(request.id.clone()),
        );
    }

    /// Records the outcome of a dispatched request.
    ///
    /// The level follows the status code: 5xx and status-0 placeholders
    /// are errors, 4xx are warnings, everything else is informational.
    pub fn log_outcome(&mut self, request_id: &str, response: &ApiResponse) {
        let level = if response.status == 0 || response.is_server_error() {
            LogLevel::Error
        } else if response.is_client_error() {
            LogLevel::Warning
        } else {
            LogLevel::Info
        };
        self.push(
            level,
            format!("{} {}", response.status, response.status_text),
            Some(request_id.to_string()),
        );
    }

    /// Records a failure that produced no response.
    pub fn log_failure(&mut self, request_id: &str, message: &str) {
        self.push(
            LogLevel::Error,
            message.to_string(),
            Some(request_id.to_string()),
        );
    }

    /// Returns the number of events currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of events the journal retains.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns all events, newest first.
    pub fn newest_first(&self) -> Vec<JournalEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    /// Returns the events of a given severity, newest first.
    pub fn filter_by_level(&self, level: LogLevel) -> Vec<JournalEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }

    /// Returns the events recorded at or after a point in time, newest
    /// first.
    pub fn since(&self, when: DateTime<Utc>) -> Vec<JournalEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.timestamp >= when)
            .cloned()
            .collect()
    }

    /// Returns the events that belong to a request, newest first.
    pub fn for_request(&self, request_id: &str) -> Vec<JournalEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.request_id.as_deref() == Some(request_id))
            .cloned()
            .collect()
    }

    /// Removes all events.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;
    use chrono::Duration;
    use std::collections::HashMap;

    fn sample_request() -> ApiRequest {
        ApiRequest::new("profile-1", HttpMethod::GET, "https://api.example.com/users")
    }

    #[test]
    fn test_push_and_newest_first() {
        let mut journal = Journal::with_limit(10);
        journal.push(LogLevel::Info, "first".to_string(), None);
        journal.push(LogLevel::Info, "second".to_string(), None);

        let events = journal.newest_first();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "second");
        assert_eq!(events[1].message, "first");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut journal = Journal::with_limit(3);
        for i in 0..5 {
            journal.push(LogLevel::Info, format!("event {}", i), None);
        }

        assert_eq!(journal.len(), 3);
        let events = journal.newest_first();
        assert_eq!(events[0].message, "event 4");
        assert_eq!(events[2].message, "event 2");
    }

    #[test]
    fn test_log_dispatch_attaches_request_id() {
        let mut journal = Journal::with_limit(10);
        let request = sample_request();
        journal.log_dispatch(&request);

        let events = journal.newest_first();
        assert_eq!(events[0].level, LogLevel::Info);
        assert_eq!(events[0].message, "GET https://api.example.com/users");
        assert_eq!(events[0].request_id.as_deref(), Some(request.id.as_str()));
    }

    #[test]
    fn test_log_outcome_levels() {
        let mut journal = Journal::with_limit(10);

        let ok = ApiResponse::new(200, "OK", HashMap::new(), serde_json::Value::Null);
        journal.log_outcome("req-1", &ok);
        assert_eq!(journal.newest_first()[0].level, LogLevel::Info);

        let missing = ApiResponse::new(404, "Not Found", HashMap::new(), serde_json::Value::Null);
        journal.log_outcome("req-2", &missing);
        assert_eq!(journal.newest_first()[0].level, LogLevel::Warning);

        let broken = ApiResponse::new(
            500,
            "Internal Server Error",
            HashMap::new(),
            serde_json::Value::Null,
        );
        journal.log_outcome("req-3", &broken);
        assert_eq!(journal.newest_first()[0].level, LogLevel::Error);

        let failed = ApiResponse::failure("connection refused");
        journal.log_outcome("req-4", &failed);
        assert_eq!(journal.newest_first()[0].level, LogLevel::Error);
    }

    #[test]
    fn test_log_failure() {
        let mut journal = Journal::with_limit(10);
        journal.log_failure("req-1", "request timed out");

        let events = journal.newest_first();
        assert_eq!(events[0].level, LogLevel::Error);
        assert_eq!(events[0].message, "request timed out");
        assert_eq!(events[0].request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_filter_by_level() {
        let mut journal = Journal::with_limit(10);
        journal.push(LogLevel::Info, "a".to_string(), None);
        journal.push(LogLevel::Error, "b".to_string(), None);
        journal.push(LogLevel::Info, "c".to_string(), None);

        let errors = journal.filter_by_level(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "b");

        let infos = journal.filter_by_level(LogLevel::Info);
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].message, "c");
    }

    #[test]
    fn test_since_filters_old_events() {
        let mut journal = Journal::with_limit(10);
        journal.push(LogLevel::Info, "old".to_string(), None);
        journal.push(LogLevel::Info, "new".to_string(), None);

        let cutoff = Utc::now() + Duration::seconds(1);
        assert!(journal.since(cutoff).is_empty());

        let past = Utc::now() - Duration::minutes(5);
        assert_eq!(journal.since(past).len(), 2);
    }

    #[test]
    fn test_for_request() {
        let mut journal = Journal::with_limit(10);
        journal.push(LogLevel::Info, "a".to_string(), Some("req-1".to_string()));
        journal.push(LogLevel::Info, "b".to_string(), Some("req-2".to_string()));
        journal.push(LogLevel::Error, "c".to_string(), Some("req-1".to_string()));

        let events = journal.for_request("req-1");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "c");
        assert_eq!(events[1].message, "a");
    }

    #[test]
    fn test_clear() {
        let mut journal = Journal::with_limit(10);
        journal.push(LogLevel::Info, "a".to_string(), None);
        journal.clear();
        assert!(journal.is_empty());
    }

    #[test]
    fn test_level_serialization() {
        assert_eq!(
            serde_json::to_string(&LogLevel::Warning).unwrap(),
            "\"warning\""
        );
        let level: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, LogLevel::Error);
    }
}
