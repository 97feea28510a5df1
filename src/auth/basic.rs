//! Basic HTTP authentication implementation.
//!
//! This module provides functions for encoding and decoding HTTP Basic
//! authentication credentials according to RFC 7617. Profiles store a Basic
//! credential as a single `user:password` string; [`split_credential`] turns
//! that into the pair the encoder expects.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encodes username and password into a Basic authentication header value.
///
/// # Arguments
///
/// * `username` - The username for authentication
/// * `password` - The password for authentication
///
/// # Returns
///
/// A `String` containing the formatted Basic auth header value in the format
/// "Basic <base64_encoded_credentials>"
///
/// # Examples
///
/// ```
/// use api_workbench::auth::basic::basic_auth;
///
/// let auth_header = basic_auth("user", "pass123");
/// assert_eq!(auth_header, "Basic dXNlcjpwYXNzMTIz");
/// ```
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    let encoded = STANDARD.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}

/// Splits a profile's stored `user:password` credential at the first colon.
///
/// A credential without a colon is treated as a username with an empty
/// password, matching how the encoded form decodes.
///
/// # Examples
///
/// ```
/// use api_workbench::auth::basic::split_credential;
///
/// assert_eq!(split_credential("alice:s3cret"), ("alice", "s3cret"));
/// assert_eq!(split_credential("alice:s3:cret"), ("alice", "s3:cret"));
/// assert_eq!(split_credential("alice"), ("alice", ""));
/// ```
pub fn split_credential(credential: &str) -> (&str, &str) {
    match credential.find(':') {
        Some(pos) => (&credential[..pos], &credential[pos + 1..]),
        None => (credential, ""),
    }
}

/// Parses a Basic authentication header value and extracts the username and password.
///
/// Returns `None` if the header is malformed or cannot be decoded.
///
/// # Arguments
///
/// * `header` - The Authorization header value (e.g., "Basic dXNlcjpwYXNz")
///
/// # Returns
///
/// `Some((username, password))` if the header is valid, `None` otherwise.
///
/// # Examples
///
/// ```
/// use api_workbench::auth::basic::parse_basic_auth_header;
///
/// let result = parse_basic_auth_header("Basic dXNlcjpwYXNzMTIz");
/// assert_eq!(result, Some(("user".to_string(), "pass123".to_string())));
///
/// let invalid = parse_basic_auth_header("Bearer token123");
/// assert_eq!(invalid, None);
/// ```
pub fn parse_basic_auth_header(header: &str) -> Option<(String, String)> {
    let header = header.trim();

    if !header.starts_with("Basic ") {
        return None;
    }

    let encoded = header.strip_prefix("Basic ")?.trim();

    let decoded_bytes = STANDARD.decode(encoded).ok()?;
    let decoded_str = String::from_utf8(decoded_bytes).ok()?;

    // Split on the first colon to separate username and password
    let colon_pos = decoded_str.find(':')?;
    let username = decoded_str[..colon_pos].to_string();
    let password = decoded_str[colon_pos + 1..].to_string();

    Some((username, password))
}
