//! Connection profile data model.
//!
//! A profile names an HTTP endpoint (base URL) together with the credentials
//! and custom headers to apply to every request sent through it. Profiles are
//! persisted as JSON with camelCase field names so stored documents remain
//! compatible with previously exported data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Authentication scheme selected for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// No `Authorization` header is attached.
    None,
    /// `Authorization: Bearer <token>` using the profile's auth value.
    Bearer,
    /// `Authorization: Basic <base64>` from a `user:password` auth value.
    Basic,
}

impl AuthKind {
    /// Returns the string representation used in persisted documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::None => "none",
            AuthKind::Bearer => "bearer",
            AuthKind::Basic => "basic",
        }
    }
}

impl Default for AuthKind {
    fn default() -> Self {
        AuthKind::None
    }
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named connection configuration.
///
/// The identity is assigned at creation and never changes; every other field
/// is freely editable. History entries reference profiles by id, so deleting
/// a profile leaves its history entries orphaned rather than removing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identifier, immutable after creation.
    pub id: String,

    /// Display name shown in profile pickers.
    pub name: String,

    /// Base URL requests are resolved against, e.g. `https://api.example.com`.
    pub base_url: String,

    /// Selected authentication scheme.
    #[serde(default)]
    pub auth_type: AuthKind,

    /// Credential for the selected scheme: the raw token for `bearer`, or a
    /// `user:password` pair for `basic`. Ignored when the scheme is `none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_value: Option<String>,

    /// Optional API key sent as `X-API-Key`, independent of `auth_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom headers attached to every request through this profile.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Profile {
    /// Creates a profile with a fresh identity and no authentication.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            base_url: base_url.into(),
            auth_type: AuthKind::None,
            auth_value: None,
            api_key: None,
            headers: HashMap::new(),
        }
    }

    /// Adds a custom header to the profile.
    pub fn add_header(&mut self, name: String, value: String) {
        self.headers.insert(name, value);
    }

    /// Validates the editable fields.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the profile is usable, or a message describing the first
    /// problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Profile name must not be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base URL '{}': {}", self.base_url, e))?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(format!(
                "Unsupported URL scheme '{}' (only http and https are allowed)",
                scheme
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_identity() {
        let a = Profile::new("Staging", "https://staging.example.com");
        let b = Profile::new("Staging", "https://staging.example.com");

        assert_ne!(a.id, b.id);
        assert_eq!(a.auth_type, AuthKind::None);
        assert!(a.headers.is_empty());
    }

    #[test]
    fn test_validate_accepts_http_and_https() {
        let mut profile = Profile::new("Local", "http://localhost:3000");
        assert!(profile.validate().is_ok());

        profile.base_url = "https://api.example.com/v2".to_string();
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut profile = Profile::new("  ", "https://api.example.com");
        let err = profile.validate().unwrap_err();
        assert!(err.contains("name"));

        profile.name = "Prod".to_string();
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut profile = Profile::new("Broken", "not a url");
        assert!(profile.validate().is_err());

        profile.base_url = "ftp://files.example.com".to_string();
        let err = profile.validate().unwrap_err();
        assert!(err.contains("scheme"));
    }

    #[test]
    fn test_serializes_with_camel_case_names() {
        let mut profile = Profile::new("Prod", "https://api.example.com");
        profile.auth_type = AuthKind::Bearer;
        profile.auth_value = Some("tok".to_string());
        profile.api_key = Some("k-123".to_string());

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["baseUrl"], "https://api.example.com");
        assert_eq!(json["authType"], "bearer");
        assert_eq!(json["authValue"], "tok");
        assert_eq!(json["apiKey"], "k-123");
    }

    #[test]
    fn test_deserializes_minimal_document() {
        // Documents written before auth fields existed only carry the basics.
        let json = r#"{"id": "p1", "name": "Old", "baseUrl": "https://old.example.com"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.id, "p1");
        assert_eq!(profile.auth_type, AuthKind::None);
        assert_eq!(profile.auth_value, None);
        assert!(profile.headers.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut profile = Profile::new("QA", "https://qa.example.com");
        profile.auth_type = AuthKind::Basic;
        profile.auth_value = Some("user:pass".to_string());
        profile.add_header("X-Env".to_string(), "qa".to_string());

        let json = serde_json::to_string(&profile).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
