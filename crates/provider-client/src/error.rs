//! Provider error types.

use thiserror::Error;

/// Error type for provider interactions.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider returned a structured failure (bad credentials,
    /// duplicate account, weak password, expired session, ...).
    #[error("Provider request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// Transport-level HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed provider payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// Returns true if this error is transient and the operation can be
    /// retried: connection failures, timeouts, and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Request { status, .. } => *status >= 500,
            ProviderError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            ProviderError::Json(_) => false,
        }
    }

    /// The human-readable message to surface to the UI.
    pub fn message(&self) -> String {
        match self {
            ProviderError::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using ProviderError.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_5xx_is_transient() {
        let err = ProviderError::Request {
            status: 503,
            message: "service unavailable".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_request_4xx_is_not_transient() {
        let err = ProviderError::Request {
            status: 401,
            message: "Incorrect username or password".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_message_prefers_provider_text() {
        let err = ProviderError::Request {
            status: 400,
            message: "User already exists".to_string(),
        };
        assert_eq!(err.message(), "User already exists");
    }
}
