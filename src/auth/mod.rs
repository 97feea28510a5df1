//! HTTP authentication module.
//!
//! This module derives authentication headers from a connection profile:
//! `Authorization: Bearer <token>` or `Authorization: Basic <base64>` from the
//! profile's auth value, plus `X-API-Key` when an API key is configured. The
//! two are independent — a profile may attach both. A profile whose auth value
//! is missing or empty simply skips the `Authorization` header; issuing an
//! unauthenticated request is the caller's problem to notice, not an error.

pub mod basic;
pub mod bearer;

use crate::models::{AuthKind, Profile};
use std::collections::HashMap;

/// Header name used for profile API keys.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Authentication scheme resolved from a profile or header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// HTTP Basic authentication (RFC 7617)
    Basic { username: String, password: String },
    /// Bearer token authentication (RFC 6750)
    Bearer { token: String },
    /// No authentication
    None,
}

/// Resolves the authentication scheme a profile will use.
///
/// A `bearer` or `basic` profile with no usable auth value resolves to
/// `AuthScheme::None`.
///
/// # Arguments
///
/// * `profile` - The profile to inspect
pub fn scheme_for_profile(profile: &Profile) -> AuthScheme {
    let value = match profile.auth_value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => return AuthScheme::None,
    };

    match profile.auth_type {
        AuthKind::Bearer => AuthScheme::Bearer {
            token: value.to_string(),
        },
        AuthKind::Basic => {
            let (username, password) = basic::split_credential(value);
            AuthScheme::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }
        }
        AuthKind::None => AuthScheme::None,
    }
}

/// Applies a profile's authentication to a header map.
///
/// Inserts the `Authorization` header for the profile's scheme and the
/// `X-API-Key` header when an API key is configured, replacing any existing
/// headers of the same name case-insensitively.
///
/// # Arguments
///
/// * `profile` - The profile supplying credentials
/// * `headers` - The outbound header map to modify
///
/// # Examples
///
/// ```
/// use api_workbench::auth::apply_profile_auth;
/// use api_workbench::models::{AuthKind, Profile};
/// use std::collections::HashMap;
///
/// let mut profile = Profile::new("Prod", "https://api.example.com");
/// profile.auth_type = AuthKind::Bearer;
/// profile.auth_value = Some("tok".to_string());
///
/// let mut headers = HashMap::new();
/// apply_profile_auth(&profile, &mut headers);
/// assert_eq!(headers.get("Authorization"), Some(&"Bearer tok".to_string()));
/// ```
pub fn apply_profile_auth(profile: &Profile, headers: &mut HashMap<String, String>) {
    match scheme_for_profile(profile) {
        AuthScheme::Bearer { token } => {
            set_header(headers, "Authorization", bearer::bearer_token(&token));
        }
        AuthScheme::Basic { username, password } => {
            set_header(
                headers,
                "Authorization",
                basic::basic_auth(&username, &password),
            );
        }
        AuthScheme::None => {}
    }

    if let Some(api_key) = profile.api_key.as_deref() {
        if !api_key.trim().is_empty() {
            set_header(headers, API_KEY_HEADER, api_key.to_string());
        }
    }
}

/// Detects the authentication scheme present in a header map.
///
/// Used by the cURL generator to render Basic credentials through `-u`
/// instead of a raw `Authorization` header.
///
/// # Arguments
///
/// * `headers` - The header map to inspect
///
/// # Returns
///
/// The detected `AuthScheme`, or `AuthScheme::None` if no parseable
/// `Authorization` header is present.
pub fn detect_auth_scheme(headers: &HashMap<String, String>) -> AuthScheme {
    let auth_header = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("authorization"))
        .map(|(_, v)| v);

    if let Some(value) = auth_header {
        if let Some((username, password)) = basic::parse_basic_auth_header(value) {
            return AuthScheme::Basic { username, password };
        }
        if let Some(token) = bearer::parse_bearer_token_header(value) {
            return AuthScheme::Bearer { token };
        }
    }

    AuthScheme::None
}

/// Inserts a header, removing any existing entry with the same
/// case-insensitive name first.
pub fn set_header(headers: &mut HashMap<String, String>, name: &str, value: String) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bearer_profile(token: &str) -> Profile {
        let mut profile = Profile::new("Test", "https://api.example.com");
        profile.auth_type = AuthKind::Bearer;
        profile.auth_value = Some(token.to_string());
        profile
    }

    #[test]
    fn test_apply_bearer() {
        let profile = bearer_profile("tok");
        let mut headers = HashMap::new();

        apply_profile_auth(&profile, &mut headers);
        assert_eq!(headers.get("Authorization"), Some(&"Bearer tok".to_string()));
    }

    #[test]
    fn test_apply_basic_splits_credential() {
        let mut profile = Profile::new("Test", "https://api.example.com");
        profile.auth_type = AuthKind::Basic;
        profile.auth_value = Some("user:pass".to_string());

        let mut headers = HashMap::new();
        apply_profile_auth(&profile, &mut headers);
        assert_eq!(
            headers.get("Authorization"),
            Some(&"Basic dXNlcjpwYXNz".to_string())
        );
    }

    #[test]
    fn test_apply_none_leaves_headers_untouched() {
        let profile = Profile::new("Test", "https://api.example.com");
        let mut headers = HashMap::new();

        apply_profile_auth(&profile, &mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_empty_auth_value_skips_authorization() {
        let mut profile = bearer_profile("  ");
        let mut headers = HashMap::new();
        apply_profile_auth(&profile, &mut headers);
        assert!(!headers.contains_key("Authorization"));

        profile.auth_value = None;
        apply_profile_auth(&profile, &mut headers);
        assert!(!headers.contains_key("Authorization"));
    }

    #[test]
    fn test_api_key_is_independent_of_auth_type() {
        let mut profile = bearer_profile("tok");
        profile.api_key = Some("key-123".to_string());

        let mut headers = HashMap::new();
        apply_profile_auth(&profile, &mut headers);

        assert_eq!(headers.get("Authorization"), Some(&"Bearer tok".to_string()));
        assert_eq!(headers.get(API_KEY_HEADER), Some(&"key-123".to_string()));
    }

    #[test]
    fn test_api_key_without_auth() {
        let mut profile = Profile::new("Test", "https://api.example.com");
        profile.api_key = Some("key-123".to_string());

        let mut headers = HashMap::new();
        apply_profile_auth(&profile, &mut headers);

        assert!(!headers.contains_key("Authorization"));
        assert_eq!(headers.get(API_KEY_HEADER), Some(&"key-123".to_string()));
    }

    #[test]
    fn test_apply_replaces_existing_authorization_case_insensitively() {
        let profile = bearer_profile("new-token");
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "Basic old".to_string());

        apply_profile_auth(&profile, &mut headers);

        assert!(!headers.contains_key("authorization"));
        assert_eq!(
            headers.get("Authorization"),
            Some(&"Bearer new-token".to_string())
        );
    }

    #[test]
    fn test_scheme_for_profile_basic_without_colon() {
        let mut profile = Profile::new("Test", "https://api.example.com");
        profile.auth_type = AuthKind::Basic;
        profile.auth_value = Some("justuser".to_string());

        match scheme_for_profile(&profile) {
            AuthScheme::Basic { username, password } => {
                assert_eq!(username, "justuser");
                assert_eq!(password, "");
            }
            other => panic!("Expected Basic scheme, got {:?}", other),
        }
    }

    #[test]
    fn test_detect_auth_scheme_bearer() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer mytoken".to_string());

        assert_eq!(
            detect_auth_scheme(&headers),
            AuthScheme::Bearer {
                token: "mytoken".to_string()
            }
        );
    }

    #[test]
    fn test_detect_auth_scheme_basic_case_insensitive_name() {
        let mut headers = HashMap::new();
        headers.insert(
            "authorization".to_string(),
            "Basic dXNlcjpwYXNz".to_string(),
        );

        match detect_auth_scheme(&headers) {
            AuthScheme::Basic { username, password } => {
                assert_eq!(username, "user");
                assert_eq!(password, "pass");
            }
            other => panic!("Expected Basic scheme, got {:?}", other),
        }
    }

    #[test]
    fn test_detect_auth_scheme_none() {
        let headers = HashMap::new();
        assert_eq!(detect_auth_scheme(&headers), AuthScheme::None);
    }
}
