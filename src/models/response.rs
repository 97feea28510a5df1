//! Response data model.
//!
//! Responses are only ever produced by the dispatcher or the mock responder;
//! consumers read them, they never construct them ad hoc. A failed dispatch
//! is recorded in history as a response with status 0 whose status text
//! carries the error description.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A normalized HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// HTTP status code; 0 marks a dispatch that failed before a response
    /// was received.
    pub status: u16,

    /// Status text, e.g. "OK" or "Not Found"; for status 0 this holds the
    /// error description.
    pub status_text: String,

    /// Response headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Response body. JSON payloads are parsed; other payloads are carried
    /// as a JSON string; an empty body is `null`.
    #[serde(rename = "data")]
    pub body: Value,

    /// Timestamp of receipt.
    #[serde(rename = "timestamp")]
    pub received_at: DateTime<Utc>,
}

impl ApiResponse {
    /// Creates a response stamped with the current time.
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        headers: HashMap<String, String>,
        body: Value,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            body,
            received_at: Utc::now(),
        }
    }

    /// Creates the status-0 response recorded for a dispatch that failed
    /// before any response arrived.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(0, message, HashMap::new(), Value::Null)
    }

    /// Checks if the response indicates success (2xx).
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Checks if the response indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Checks if the response indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }
}
