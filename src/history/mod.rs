//! Request history tracking and persistence.
//!
//! Every dispatched request is recorded together with its response, so
//! past exchanges can be reviewed, searched, replayed, or deleted. The
//! log is bounded and drops its oldest entries first.
//!
//! # Features
//!
//! - Request/response pairs keyed by request id
//! - Bounded retention with oldest-first eviction
//! - Sensitive header masking before entries are stored
//! - Free-text search and method/status filtering
//! - Persistence through the key/value store
//!
//! # Example
//!
//! ```ignore
//! use api_workbench::history::{HistoryEntry, HistoryLog, search_history};
//!
//! let mut log = HistoryLog::new();
//! log.record(HistoryEntry::new(request, response));
//!
//! let matches = search_history("api/users", &log);
//! ```

pub mod log;
pub mod models;
pub mod search;

pub use self::log::HistoryLog;
pub use models::{
    is_masked_value, is_sensitive_header, redact_headers, HistoryEntry, SENSITIVE_HEADERS,
};
pub use search::{
    filter_by_method, filter_by_status, filter_failures, recent, search_history,
};
