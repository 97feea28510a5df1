//! Request data model.
//!
//! This module defines the HTTP method enum and the [`ApiRequest`] structure
//! describing a single dispatch: which profile to send through, the target
//! path, and any headers, query parameters, or body to include. Requests are
//! immutable once issued; replaying one constructs a new request with a fresh
//! identity rather than mutating the stored copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// HTTP request method.
///
/// Covers the methods the request form exposes; the dispatcher maps these
/// directly onto the underlying HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
        }
    }

    /// Parses a string into an HttpMethod.
    ///
    /// # Arguments
    ///
    /// * `s` - A string slice representing the HTTP method
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a supported method, `None` otherwise.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single request issued through a profile.
///
/// The `url` field holds the target path, resolved against the profile's base
/// URL at dispatch time; an absolute URL passes through unchanged. Query
/// parameters map names to JSON values so that structured mock filter
/// conditions can travel through the same field as plain string parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    /// Unique identifier used for history lookups and cancellation.
    pub id: String,

    /// Identity of the profile this request is sent through.
    pub profile_id: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// Target path (or absolute URL).
    pub url: String,

    /// Request-specific headers, applied after profile headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Query parameters. Plain values become query-string pairs; object
    /// values are understood by the mock responder as filter conditions.
    #[serde(default)]
    pub params: HashMap<String, Value>,

    /// Optional JSON body.
    #[serde(default, rename = "data", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Creation timestamp.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ApiRequest {
    /// Creates a new request with a fresh identity and creation timestamp.
    ///
    /// # Arguments
    ///
    /// * `profile_id` - Identity of the profile to send through
    /// * `method` - HTTP method
    /// * `url` - Target path or absolute URL
    pub fn new(profile_id: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            profile_id: profile_id.into(),
            method,
            url: url.into(),
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a request-specific header.
    pub fn add_header(&mut self, name: String, value: String) {
        self.headers.insert(name, value);
    }

    /// Adds a query parameter.
    pub fn add_param(&mut self, name: String, value: Value) {
        self.params.insert(name, value);
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Checks whether the request carries a body.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().map_or(false, |b| !b.is_null())
    }

    /// Returns a copy of this request under a fresh identity and timestamp.
    ///
    /// Replays go through here so that two dispatches never share a
    /// cancellation identity.
    pub fn reissued(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            ..self.clone()
        }
    }
}
