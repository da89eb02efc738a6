//! Error types for the instance-variables API.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the GitLab API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// Authentication failed or token invalid.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Classify a non-2xx status code and response body into a typed error.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::Auth(format!("{}: {}", status, body)),
            429 => Self::RateLimited {
                reset_at: Utc::now() + chrono::Duration::minutes(1),
            },
            _ => Self::Api {
                status,
                message: body.to_string(),
            },
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        Self::Http(err.to_string())
    }
}

/// Check if an error indicates a rate limit.
#[must_use]
pub fn is_rate_limit_error(err: &ApiError) -> bool {
    match err {
        ApiError::RateLimited { .. } => true,
        ApiError::Api { status: 429, .. } => true,
        _ => false,
    }
}

/// Check if a create failure means the (key, scope) pair already exists.
///
/// GitLab rejects a duplicate create with 400 and a "has already been taken"
/// message. Anything else is not a conflict and must not trigger the
/// delete-then-create fallback.
#[must_use]
pub fn is_duplicate_key_error(err: &ApiError) -> bool {
    match err {
        ApiError::Api { status: 409, .. } => true,
        ApiError::Api {
            status: 400,
            message,
        } => message.contains("has already been taken"),
        _ => false,
    }
}

/// Get a short error message suitable for display.
#[must_use]
pub fn short_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Http(_) => "Network error".to_string(),
        ApiError::Json(_) => "JSON parse error".to_string(),
        ApiError::Api { status, message } => {
            if message.len() > 50 {
                // Use chars to avoid slicing into a multi-byte UTF-8 sequence
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        ApiError::RateLimited { .. } => "Rate limited".to_string(),
        ApiError::Auth(_) => "Authentication failed".to_string(),
        ApiError::Config(msg) => format!("Config: {}", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        let err = ApiError::from_status(401, "invalid token");
        assert!(matches!(err, ApiError::Auth(_)));

        let err = ApiError::from_status(403, "insufficient scope");
        assert!(matches!(err, ApiError::Auth(_)));

        let err = ApiError::from_status(429, "slow down");
        assert!(matches!(err, ApiError::RateLimited { .. }));

        let err = ApiError::from_status(404, "no such thing");
        assert!(matches!(err, ApiError::Api { status: 404, .. }));
    }

    #[test]
    fn test_is_rate_limit_error() {
        let rate_limited = ApiError::RateLimited {
            reset_at: Utc::now(),
        };
        assert!(is_rate_limit_error(&rate_limited));

        let api_429 = ApiError::Api {
            status: 429,
            message: "too many requests".to_string(),
        };
        assert!(is_rate_limit_error(&api_429));

        let api_500 = ApiError::Api {
            status: 500,
            message: "server error".to_string(),
        };
        assert!(!is_rate_limit_error(&api_500));

        let auth = ApiError::Auth("bad token".to_string());
        assert!(!is_rate_limit_error(&auth));
    }

    #[test]
    fn test_is_duplicate_key_error() {
        let conflict = ApiError::Api {
            status: 409,
            message: "conflict".to_string(),
        };
        assert!(is_duplicate_key_error(&conflict));

        let taken = ApiError::Api {
            status: 400,
            message: r#"{"message":{"key":["(FOO) has already been taken"]}}"#.to_string(),
        };
        assert!(is_duplicate_key_error(&taken));

        let other_400 = ApiError::Api {
            status: 400,
            message: "value is invalid".to_string(),
        };
        assert!(!is_duplicate_key_error(&other_400));

        let transport = ApiError::Http("connection reset".to_string());
        assert!(!is_duplicate_key_error(&transport));
    }

    #[test]
    fn test_short_error_message_truncates_long_bodies() {
        let err = ApiError::Api {
            status: 500,
            message: "x".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 500: "));
        assert!(msg.ends_with("..."));

        let err = ApiError::RateLimited {
            reset_at: Utc::now(),
        };
        assert_eq!(short_error_message(&err), "Rate limited");
    }
}
