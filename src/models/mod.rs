//! Core data models.
//!
//! This module contains the data structures shared across the workbench:
//! connection profiles, requests, and responses, all serialized with the
//! camelCase field names used by persisted and exported documents.

pub mod profile;
pub mod request;
pub mod response;

pub use profile::{AuthKind, Profile};
pub use request::{ApiRequest, HttpMethod};
pub use response::ApiResponse;
