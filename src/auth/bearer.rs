//! Bearer token authentication implementation.
//!
//! This module provides functions for formatting Bearer token authentication
//! headers according to RFC 6750.

/// Formats a token into a Bearer authentication header value.
///
/// # Arguments
///
/// * `token` - The authentication token
///
/// # Returns
///
/// A `String` containing the formatted Bearer auth header value in the format
/// "Bearer <token>"
///
/// # Examples
///
/// ```
/// use api_workbench::auth::bearer::bearer_token;
///
/// let auth_header = bearer_token("abc123xyz");
/// assert_eq!(auth_header, "Bearer abc123xyz");
/// ```
pub fn bearer_token(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Parses a Bearer authentication header value and extracts the token.
///
/// Returns `None` if the header is malformed or doesn't start with "Bearer ".
///
/// # Arguments
///
/// * `header` - The Authorization header value (e.g., "Bearer abc123")
///
/// # Returns
///
/// `Some(token)` if the header is valid, `None` otherwise.
///
/// # Examples
///
/// ```
/// use api_workbench::auth::bearer::parse_bearer_token_header;
///
/// let result = parse_bearer_token_header("Bearer abc123xyz");
/// assert_eq!(result, Some("abc123xyz".to_string()));
///
/// let invalid = parse_bearer_token_header("Basic dXNlcjpwYXNz");
/// assert_eq!(invalid, None);
/// ```
pub fn parse_bearer_token_header(header: &str) -> Option<String> {
    let header = header.trim();

    if !header.starts_with("Bearer ") {
        return None;
    }

    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}
