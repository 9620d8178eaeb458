//! Error types for the Jobscout client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the scraping API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API rejected the credentials
    #[error("Authentication rejected (status {status}): {message}")]
    Auth {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The response did not have the expected shape
    #[error("Unexpected response: {0}")]
    Protocol(String),

    /// API returned any other error status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },
}

impl ClientError {
    /// Create the error matching a non-success status code
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth { status, message },
            _ => Self::Api { status, message },
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Check if this error is a credential rejection
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(ClientError::from_status(401, "bad credentials").is_auth());
        assert!(ClientError::from_status(403, "forbidden").is_auth());
        assert!(!ClientError::from_status(404, "missing").is_auth());
        assert!(ClientError::from_status(502, "bad gateway").is_server_error());
    }
}
