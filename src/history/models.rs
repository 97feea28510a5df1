//! Data models for request history.
//!
//! History pairs each dispatched request with the response it produced.
//! Entries are identified by the request id, so replaying or deleting a
//! past exchange never needs a separate bookkeeping id.

use crate::models::{ApiRequest, ApiResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header names whose values are masked before an entry is stored.
///
/// These headers carry credentials or session material that should not
/// survive in a persisted history file or an exported document.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "api-key",
    "x-auth-token",
    "access-token",
];

/// A single request/response exchange kept in history.
///
/// The pair is stored as it went over the wire, except that sensitive
/// header values may be masked depending on configuration. Failed
/// dispatches are recorded too, with a status of `0` and the error text
/// in the response's status line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The request that was dispatched.
    pub request: ApiRequest,

    /// The response that came back, or a status-0 placeholder when the
    /// dispatch failed before producing one.
    pub response: ApiResponse,
}

impl HistoryEntry {
    /// Creates a history entry from a completed exchange.
    ///
    /// # Arguments
    ///
    /// * `request` - The request that was dispatched
    /// * `response` - The response it produced
    pub fn new(request: ApiRequest, response: ApiResponse) -> Self {
        Self { request, response }
    }

    /// Returns the id of the request this entry records.
    ///
    /// History is keyed by this id for lookup and deletion.
    pub fn request_id(&self) -> &str {
        &self.request.id
    }

    /// Checks whether this exchange ended in failure.
    ///
    /// # Returns
    ///
    /// `true` for 4xx and 5xx responses and for status-0 placeholders
    /// recorded when the dispatch itself failed.
    pub fn is_failure(&self) -> bool {
        self.response.status == 0
            || self.response.is_client_error()
            || self.response.is_server_error()
    }

    /// Returns a copy with sensitive header values masked.
    ///
    /// Both request and response headers are masked. Values that start
    /// with a scheme word (`Bearer abc123`) keep the scheme so the entry
    /// still shows which mechanism was used.
    ///
    /// # Returns
    ///
    /// A new `HistoryEntry` safe for persistence and export.
    pub fn redacted(&self) -> Self {
        let mut entry = self.clone();
        redact_headers(&mut entry.request.headers);
        redact_headers(&mut entry.response.headers);
        entry
    }
}

/// Masks the values of sensitive headers in place.
///
/// Header name matching is case-insensitive. Non-sensitive headers are
/// left untouched.
///
/// # Arguments
///
/// * `headers` - The header map to mask
pub fn redact_headers(headers: &mut HashMap<String, String>) {
    for (name, value) in headers.iter_mut() {
        if is_sensitive_header(name) {
            *value = mask_value(value);
        }
    }
}

/// Checks whether a header name is considered sensitive.
pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
}

/// Masks a header value, keeping a leading scheme word when present.
fn mask_value(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, _)) if !scheme.is_empty() => format!("{} ***", scheme),
        _ => "***".to_string(),
    }
}

/// Checks whether a header value is a redaction placeholder.
///
/// Requests rebuilt from recorded entries must drop these rather than
/// put the literal mask on the wire.
pub fn is_masked_value(value: &str) -> bool {
    value == "***" || value.ends_with(" ***")
}
