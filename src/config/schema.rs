//! Configuration schema for the workbench.
//!
//! This module defines the configuration structure and validation logic for
//! all tunable settings: dispatch timeout and retry policy, history and
//! journal capacities, mock latency, and header redaction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure for the workbench.
///
/// Loaded from a JSON document under the "apiWorkbench" key. Missing or
/// invalid settings fall back to sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchConfig {
    /// Request timeout in milliseconds.
    ///
    /// Maximum time to wait for a complete response (including connection,
    /// headers, and body download). Defaults to 30000ms (30 seconds).
    ///
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Number of retries after a failed first attempt.
    ///
    /// Only 5xx responses and connection failures are retried; 4xx responses
    /// and timeouts are terminal. Defaults to 2 (three attempts in total).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay between attempts in milliseconds.
    ///
    /// Fixed, not exponential. Defaults to 500ms. May be 0.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Maximum number of entries to keep in history.
    ///
    /// Appending beyond this limit evicts the oldest entry. Defaults to 100.
    ///
    /// Must be > 0.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Maximum number of entries the journal ring buffer retains.
    ///
    /// Defaults to 1000. Must be > 0.
    #[serde(default = "default_journal_limit")]
    pub journal_limit: usize,

    /// Upper bound on simulated mock latency in milliseconds.
    ///
    /// Each mock response sleeps a uniformly random duration up to this
    /// bound; 0 disables the delay. Defaults to 200ms.
    #[serde(default = "default_mock_latency")]
    pub mock_latency: u64,

    /// Time-to-live for cached responses in milliseconds.
    ///
    /// Defaults to 300000ms (5 minutes). Must be > 0.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Whether to redact sensitive request headers before storing a request
    /// in history.
    ///
    /// Replay is unaffected since auth headers are re-derived from the
    /// profile at dispatch time. Defaults to true.
    #[serde(default = "default_redact_sensitive_headers")]
    pub redact_sensitive_headers: bool,

    /// Default headers to include in all requests.
    ///
    /// Added to every request unless overridden by profile or
    /// request-specific headers. Defaults to a User-Agent header only.
    #[serde(default = "default_headers")]
    pub default_headers: HashMap<String, String>,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retry_attempts: default_retry_attempts(),
            retry_delay: default_retry_delay(),
            history_limit: default_history_limit(),
            journal_limit: default_journal_limit(),
            mock_latency: default_mock_latency(),
            cache_ttl: default_cache_ttl(),
            redact_sensitive_headers: default_redact_sensitive_headers(),
            default_headers: default_headers(),
        }
    }
}

impl WorkbenchConfig {
    /// Validates the configuration and returns errors if any settings are invalid.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.history_limit == 0 {
            return Err("historyLimit must be greater than 0".to_string());
        }

        if self.journal_limit == 0 {
            return Err("journalLimit must be greater than 0".to_string());
        }

        if self.cache_ttl == 0 {
            return Err("cacheTtl must be greater than 0".to_string());
        }

        // retry_attempts, retry_delay, and mock_latency may all be 0

        Ok(())
    }

    /// Returns the timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout)
    }

    /// Returns the inter-attempt retry delay as a `std::time::Duration`.
    pub fn retry_delay_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retry_delay)
    }

    /// Returns the response cache TTL as a `std::time::Duration`.
    pub fn cache_ttl_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cache_ttl)
    }

    /// Merges this configuration with another, using values from `other` where present.
    ///
    /// This is useful for applying user settings on top of defaults.
    ///
    /// # Arguments
    ///
    /// * `other` - Configuration to merge with (takes precedence)
    ///
    /// # Returns
    ///
    /// A new `WorkbenchConfig` with merged values.
    pub fn merge(&self, other: &WorkbenchConfig) -> Self {
        Self {
            timeout: other.timeout,
            retry_attempts: other.retry_attempts,
            retry_delay: other.retry_delay,
            history_limit: other.history_limit,
            journal_limit: other.journal_limit,
            mock_latency: other.mock_latency,
            cache_ttl: other.cache_ttl,
            redact_sensitive_headers: other.redact_sensitive_headers,
            default_headers: other.default_headers.clone(),
        }
    }
}

// Default value functions for serde

fn default_timeout() -> u64 {
    30000 // 30 seconds in milliseconds
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    500
}

fn default_history_limit() -> usize {
    100
}

fn default_journal_limit() -> usize {
    1000
}

fn default_mock_latency() -> u64 {
    200
}

fn default_cache_ttl() -> u64 {
    300000 // 5 minutes in milliseconds
}

fn default_redact_sensitive_headers() -> bool {
    true
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), "api-workbench/0.2".to_string());
    headers
}
