//! Request dispatch.
//!
//! The dispatcher turns a profile plus a request into an outbound HTTP
//! call: it resolves the target URL against the profile's base URL,
//! merges configured, auth, profile, and request headers, applies the
//! configured timeout, and retries transient failures. Every dispatch is
//! registered for cancellation under its request id; cancelling wakes
//! the dispatch mid-call or mid-delay and surfaces
//! [`DispatchError::Cancelled`] to that caller only.

pub mod cache;
pub mod cancellation;
pub mod error;

pub use cache::{CacheStats, ResponseCache};
pub use cancellation::{CancelError, RequestHandle, RequestTracker};
pub use error::DispatchError;

use crate::auth::{apply_profile_auth, set_header};
use crate::config::get_config;
use crate::models::{ApiRequest, ApiResponse, HttpMethod, Profile};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Issues real HTTP calls for the workbench.
///
/// The dispatcher is cheap to share: the underlying client pools
/// connections, and the tracker is reference-counted so cancellation can
/// be driven from outside the dispatching task.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    tracker: Arc<RequestTracker>,
}

impl Dispatcher {
    /// Creates a dispatcher with the timeout from the global
    /// configuration.
    pub fn new() -> Result<Self, DispatchError> {
        Self::with_timeout(get_config().timeout_duration())
    }

    /// Creates a dispatcher with an explicit per-attempt timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Network(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            tracker: Arc::new(RequestTracker::new()),
        })
    }

    /// Returns the tracker registering this dispatcher's in-flight
    /// requests.
    pub fn tracker(&self) -> Arc<RequestTracker> {
        Arc::clone(&self.tracker)
    }

    /// Cancels an in-flight request by id.
    pub fn cancel(&self, request_id: &str) -> Result<(), CancelError> {
        self.tracker.cancel(request_id)
    }

    /// Dispatches a request through a profile.
    ///
    /// Retries 5xx responses and connection failures up to the
    /// configured attempt count with a fixed inter-attempt delay; 4xx
    /// responses and timeouts are terminal. The dispatch can be
    /// cancelled at any point through [`Dispatcher::cancel`].
    ///
    /// # Arguments
    ///
    /// * `profile` - The profile supplying base URL, auth, and headers
    /// * `request` - The request to send
    pub async fn dispatch(
        &self,
        profile: &Profile,
        request: &ApiRequest,
    ) -> Result<ApiResponse, DispatchError> {
        let url = resolve_url(&profile.base_url, &request.url)?;
        let headers = merge_headers(profile, request);

        let handle = RequestHandle::with_id(request.id.clone());
        self.tracker.register(handle.clone());

        let result = self
            .run_attempts(&handle, request, url.as_str(), &headers)
            .await;

        self.tracker.unregister(&request.id);
        result
    }

    /// Runs the attempt loop for one dispatch.
    async fn run_attempts(
        &self,
        handle: &RequestHandle,
        request: &ApiRequest,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ApiResponse, DispatchError> {
        let config = get_config();
        let total_attempts = config.retry_attempts + 1;

        let mut attempt = 0;
        loop {
            attempt += 1;
            log::debug!(
                "dispatch {} attempt {}/{}: {} {}",
                request.id,
                attempt,
                total_attempts,
                request.method,
                url
            );

            let outcome = tokio::select! {
                outcome = self.send_once(request, url, headers) => outcome,
                _ = handle.cancelled() => return Err(DispatchError::Cancelled),
            };

            let retryable = match &outcome {
                Ok(response) => response.is_server_error(),
                Err(DispatchError::Network(_)) => true,
                Err(_) => false,
            };

            if !retryable || attempt >= total_attempts {
                return outcome;
            }

            log::debug!(
                "dispatch {} attempt {} failed, retrying in {}ms",
                request.id,
                attempt,
                config.retry_delay
            );
            tokio::select! {
                _ = tokio::time::sleep(config.retry_delay_duration()) => {}
                _ = handle.cancelled() => return Err(DispatchError::Cancelled),
            }
        }
    }

    /// Sends the request once and normalizes the response.
    async fn send_once(
        &self,
        request: &ApiRequest,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<ApiResponse, DispatchError> {
        let method = match request.method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::PATCH => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, url);

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let query = query_pairs(&request.params);
        if !query.is_empty() {
            builder = builder.query(&query);
        }

        if let Some(body) = &request.body {
            if !body.is_null() {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                response_headers.insert(name.as_str().to_string(), value_str.to_string());
            }
        }

        let declared_json = response_headers
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("content-type") && v.contains("application/json"));

        let raw = response.text().await?;
        let body = normalize_body(&raw, declared_json)?;

        Ok(ApiResponse::new(status, status_text, response_headers, body))
    }
}

/// Resolves a request path against a profile's base URL.
///
/// An absolute `http`/`https` URL passes through unchanged.
pub(crate) fn resolve_url(base_url: &str, path: &str) -> Result<Url, DispatchError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Url::parse(path)?);
    }

    let base = Url::parse(base_url)?;
    Ok(base.join(path)?)
}

/// Merges the header layers for an outbound request.
///
/// Precedence, lowest first: configured default headers, profile auth,
/// profile custom headers, request-specific headers. Later layers
/// replace earlier ones case-insensitively.
pub(crate) fn merge_headers(profile: &Profile, request: &ApiRequest) -> HashMap<String, String> {
    let mut headers = HashMap::new();

    for (name, value) in &get_config().default_headers {
        set_header(&mut headers, name, value.clone());
    }

    apply_profile_auth(profile, &mut headers);

    for (name, value) in &profile.headers {
        set_header(&mut headers, name, value.clone());
    }

    for (name, value) in &request.headers {
        set_header(&mut headers, name, value.clone());
    }

    headers
}

/// Flattens request parameters into query-string pairs.
///
/// Structured values (the mock filter conditions) are carried as their
/// compact JSON rendering, matching what the original client put on the
/// wire.
pub(crate) fn query_pairs(params: &HashMap<String, Value>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect();
    pairs.sort();
    pairs
}

/// Normalizes a response body into a JSON value.
///
/// A body declared `application/json` that does not parse is an
/// [`DispatchError::InvalidResponse`]; undeclared bodies that happen to
/// be JSON are parsed opportunistically, and anything else is carried as
/// a string. An empty body is `null`.
fn normalize_body(raw: &str, declared_json: bool) -> Result<Value, DispatchError> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(e) if declared_json => Err(DispatchError::InvalidResponse(format!(
            "declared JSON body did not parse: {}",
            e
        ))),
        Err(_) => Ok(Value::String(raw.to_string())),
    }
}
