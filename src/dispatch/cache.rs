//! TTL cache for dispatched responses.
//!
//! The cache keys on everything that shapes a response: method, resolved
//! URL, parameters, and body. Entries expire after a fixed TTL and are
//! dropped lazily when they are next touched; nothing runs in the
//! background.

use crate::config::get_config;
use crate::models::{ApiRequest, ApiResponse};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Simple counts describing the cache's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently stored, live or not.
    pub entries: usize,
    /// Entries still within their TTL.
    pub live: usize,
    /// Entries past their TTL but not yet dropped.
    pub expired: usize,
}

#[derive(Debug)]
struct CacheEntry {
    response: ApiResponse,
    stored_at: Instant,
}

/// A bounded-lifetime response cache.
///
/// Interior mutability keeps the caller-facing API `&self`, matching how
/// the workbench shares it.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Creates a cache with the TTL from the global configuration.
    pub fn new() -> Self {
        Self::with_ttl(get_config().cache_ttl_duration())
    }

    /// Creates a cache with an explicit TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Looks up a cached response for a request.
    ///
    /// An expired entry is dropped on the spot and reported as a miss.
    pub fn get(&self, request: &ApiRequest) -> Option<ApiResponse> {
        let key = cache_key(request);
        let mut entries = self.guard();

        match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Stores a response for a request.
    pub fn put(&self, request: &ApiRequest, response: &ApiResponse) {
        let key = cache_key(request);
        self.guard().insert(
            key,
            CacheEntry {
                response: response.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.guard().clear();
    }

    /// Reports how many entries the cache holds and how many are still
    /// live.
    pub fn stats(&self) -> CacheStats {
        let entries = self.guard();
        let live = entries
            .values()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .count();
        CacheStats {
            entries: entries.len(),
            live,
            expired: entries.len() - live,
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the cache key for a request.
///
/// Parameters are rendered in sorted order so two requests that differ
/// only in map iteration order share a key. The owning profile is part
/// of the key, since the same path means different things under
/// different base URLs; the request id is not, so replays of the same
/// exchange hit the same entry.
fn cache_key(request: &ApiRequest) -> String {
    let mut params: Vec<(&String, String)> = request
        .params
        .iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect();
    params.sort();

    let params_part = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let body_part = request
        .body
        .as_ref()
        .map(|body| body.to_string())
        .unwrap_or_default();

    format!(
        "{}|{}|{}|{}|{}",
        request.profile_id, request.method, request.url, params_part, body_part
    )
}
