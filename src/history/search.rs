//! Search and filtering over recorded history.
//!
//! These helpers let a caller find past exchanges by free-text query or
//! narrow them down by method, status, or outcome. Results are returned
//! as owned copies in the log's oldest-first order unless stated
//! otherwise.

use super::log::HistoryLog;
use super::models::HistoryEntry;
use crate::models::HttpMethod;

/// Searches history using case-insensitive substring matching.
///
/// The query is matched against the URL, the HTTP method, the request
/// body, the response body, and the response status line. An empty query
/// returns every entry.
///
/// # Arguments
///
/// * `query` - The search term to match against
/// * `log` - The history to search through
///
/// # Returns
///
/// Matching entries in their original order.
pub fn search_history(query: &str, log: &HistoryLog) -> Vec<HistoryEntry> {
    if query.is_empty() {
        return log.iter().cloned().collect();
    }

    let query_lower = query.to_lowercase();
    log.iter()
        .filter(|entry| matches_query(entry, &query_lower))
        .cloned()
        .collect()
}

/// Checks if an entry matches the given lowercase query.
fn matches_query(entry: &HistoryEntry, query_lower: &str) -> bool {
    if entry.request.url.to_lowercase().contains(query_lower) {
        return true;
    }

    if entry
        .request
        .method
        .as_str()
        .to_lowercase()
        .contains(query_lower)
    {
        return true;
    }

    if let Some(body) = &entry.request.body {
        if body.to_string().to_lowercase().contains(query_lower) {
            return true;
        }
    }

    if !entry.response.body.is_null()
        && entry
            .response
            .body
            .to_string()
            .to_lowercase()
            .contains(query_lower)
    {
        return true;
    }

    // Failed dispatches keep their error text in the status line.
    entry
        .response
        .status_text
        .to_lowercase()
        .contains(query_lower)
}

/// Filters history entries by HTTP method.
///
/// # Arguments
///
/// * `method` - The method to filter by
/// * `log` - The history to filter
pub fn filter_by_method(method: HttpMethod, log: &HistoryLog) -> Vec<HistoryEntry> {
    log.iter()
        .filter(|entry| entry.request.method == method)
        .cloned()
        .collect()
}

/// Filters history entries by response status code.
///
/// # Arguments
///
/// * `status` - The status code to filter by
/// * `log` - The history to filter
pub fn filter_by_status(status: u16, log: &HistoryLog) -> Vec<HistoryEntry> {
    log.iter()
        .filter(|entry| entry.response.status == status)
        .cloned()
        .collect()
}

/// Returns the entries whose exchange ended in failure.
///
/// Covers 4xx and 5xx responses and status-0 placeholders recorded for
/// dispatches that never produced a response.
pub fn filter_failures(log: &HistoryLog) -> Vec<HistoryEntry> {
    log.iter()
        .filter(|entry| entry.is_failure())
        .cloned()
        .collect()
}

/// Returns the most recent entries, newest first.
///
/// # Arguments
///
/// * `count` - Maximum number of entries to return
/// * `log` - The history to read from
pub fn recent(count: usize, log: &HistoryLog) -> Vec<HistoryEntry> {
    log.iter().rev().take(count).cloned().collect()
}
