//! Error types for request dispatch.
//!
//! Everything that can go wrong between "send this request" and "here
//! is the response" is collapsed into one enum, so callers match on a
//! closed set instead of inspecting client internals.

use std::fmt;

/// Errors that can occur while dispatching a request.
#[derive(Debug)]
pub enum DispatchError {
    /// The request referenced a profile that does not exist.
    ///
    /// Carries the missing profile id. Typical for replays of history
    /// entries whose profile was deleted in the meantime.
    ProfileMissing(String),

    /// The composed URL could not be parsed.
    InvalidUrl(String),

    /// A network-level failure: connection refused, DNS failure, or a
    /// broken transfer.
    Network(String),

    /// The request ran past the configured timeout.
    Timeout,

    /// TLS handshake or certificate problem on an HTTPS connection.
    Tls(String),

    /// The caller cancelled the request while it was in flight.
    Cancelled,

    /// The server declared a JSON body that did not parse.
    InvalidResponse(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::ProfileMissing(id) => write!(f, "Profile not found: {}", id),
            DispatchError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            DispatchError::Network(msg) => write!(f, "Network error: {}", msg),
            DispatchError::Timeout => write!(f, "Request timed out"),
            DispatchError::Tls(msg) => write!(f, "TLS error: {}", msg),
            DispatchError::Cancelled => write!(f, "Request cancelled"),
            DispatchError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Maps reqwest errors onto the dispatch error set.
///
/// Timeouts and TLS problems get their own variants; everything else is
/// reported as a network failure with the client's message.
impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchError::Timeout
        } else if err.is_connect() {
            DispatchError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            DispatchError::InvalidResponse(err.to_string())
        } else {
            let message = err.to_string();
            if message.contains("certificate") || message.contains("TLS") || message.contains("SSL")
            {
                DispatchError::Tls(message)
            } else {
                DispatchError::Network(message)
            }
        }
    }
}

/// Maps URL parsing failures onto the dispatch error set.
impl From<url::ParseError> for DispatchError {
    fn from(err: url::ParseError) -> Self {
        DispatchError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let network = DispatchError::Network("Connection refused".to_string());
        assert_eq!(format!("{}", network), "Network error: Connection refused");

        let timeout = DispatchError::Timeout;
        assert_eq!(format!("{}", timeout), "Request timed out");

        let missing = DispatchError::ProfileMissing("profile-9".to_string());
        assert_eq!(format!("{}", missing), "Profile not found: profile-9");

        let cancelled = DispatchError::Cancelled;
        assert_eq!(format!("{}", cancelled), "Request cancelled");
    }

    #[test]
    fn test_url_error_conversion() {
        let err: DispatchError = url::ParseError::EmptyHost.into();
        assert!(matches!(err, DispatchError::InvalidUrl(_)));
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: &dyn std::error::Error = &DispatchError::Timeout;
        assert_eq!(format!("{}", err), "Request timed out");
    }
}
