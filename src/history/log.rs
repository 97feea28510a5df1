//! Bounded log of request/response exchanges.
//!
//! The log keeps the most recent exchanges in insertion order, oldest
//! first. Recording past the limit drops the oldest entries, so the log
//! never grows beyond its configured size. Persistence goes through the
//! key/value store under the `history` key.

use super::models::HistoryEntry;
use crate::config::get_config;
use crate::store::{FileStore, StoreError, HISTORY_KEY};
use std::collections::VecDeque;

/// A bounded, persistable collection of history entries.
///
/// The limit and redaction behavior are captured when the log is
/// created, either from the global configuration or explicitly through
/// [`HistoryLog::with_settings`].
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
    redact: bool,
}

impl HistoryLog {
    /// Creates an empty log sized from the global configuration.
    pub fn new() -> Self {
        let config = get_config();
        Self::with_settings(config.history_limit, config.redact_sensitive_headers)
    }

    /// Creates an empty log with an explicit limit and redaction flag.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of entries the log retains
    /// * `redact` - Whether sensitive header values are masked on record
    pub fn with_settings(limit: usize, redact: bool) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
            redact,
        }
    }

    /// Records a completed exchange.
    ///
    /// The entry is appended as the newest item. If redaction is enabled,
    /// sensitive header values are masked before the entry is stored.
    /// Oldest entries are dropped once the log exceeds its limit.
    pub fn record(&mut self, entry: HistoryEntry) {
        let entry = if self.redact { entry.redacted() } else { entry };
        self.entries.push_back(entry);
        self.trim_to_limit();
    }

    /// Returns the number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries the log retains.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Iterates over entries from oldest to newest.
    ///
    /// The iterator is double-ended; reversing it walks newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Finds the entry recorded for a request id.
    ///
    /// # Arguments
    ///
    /// * `request_id` - The id of the dispatched request
    ///
    /// # Returns
    ///
    /// The matching entry, or `None` if no exchange with that id is held.
    pub fn find(&self, request_id: &str) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.request_id() == request_id)
    }

    /// Removes the entry recorded for a request id.
    ///
    /// # Returns
    ///
    /// The removed entry, or `None` if no exchange with that id is held.
    pub fn remove(&mut self, request_id: &str) -> Option<HistoryEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.request_id() == request_id)?;
        self.entries.remove(index)
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Loads the log from the key/value store.
    ///
    /// A missing `history` key yields an empty log. Entries beyond the
    /// configured limit are dropped oldest-first, which handles a limit
    /// that shrank since the file was written.
    ///
    /// # Arguments
    ///
    /// * `store` - The store to read from
    pub fn load(store: &FileStore) -> Result<Self, StoreError> {
        let mut log = Self::new();
        if let Some(entries) = store.get_as::<Vec<HistoryEntry>>(HISTORY_KEY)? {
            log.entries = entries.into();
            let dropped = log.trim_to_limit();
            if dropped > 0 {
                log::debug!(
                    "dropped {} history entries beyond the limit of {}",
                    dropped,
                    log.limit
                );
            }
        }
        Ok(log)
    }

    /// Saves the log to the key/value store.
    ///
    /// Entries are written oldest-first under the `history` key.
    ///
    /// # Arguments
    ///
    /// * `store` - The store to write through
    pub fn save(&self, store: &mut FileStore) -> Result<(), StoreError> {
        store.set_as(HISTORY_KEY, &self.entries)
    }

    /// Drops oldest entries until the log fits its limit.
    fn trim_to_limit(&mut self) -> usize {
        let mut dropped = 0;
        while self.entries.len() > self.limit {
            self.entries.pop_front();
            dropped += 1;
        }
        dropped
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
