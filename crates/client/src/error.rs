//! Client error types.

use campusync_core::query::QueryError;
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in the transport and configuration layer.
///
/// At the backend boundary these are converted into [`QueryError`], the
/// taxonomy the retry policy and the executors work with.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for QueryError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Request(e) if e.is_decode() => QueryError::Decode(e.to_string()),
            ClientError::Request(e) => match e.status() {
                Some(status) => QueryError::from_status(status.as_u16(), e.to_string()),
                None => QueryError::Network(e.to_string()),
            },
            ClientError::ServerError { status, message } => {
                QueryError::from_status(status, message)
            }
            ClientError::InvalidResponse(message) => QueryError::Decode(message),
            ClientError::Json(e) => QueryError::Decode(e.to_string()),
            ClientError::InvalidInput(message) | ClientError::Config(message) => {
                QueryError::Rejected {
                    status: 400,
                    message,
                }
            }
            ClientError::Io(e) => QueryError::Network(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_keeps_status() {
        let error: QueryError = ClientError::ServerError {
            status: 401,
            message: "Token expired".to_string(),
        }
        .into();
        assert!(error.is_unauthorized());
        assert_eq!(error.user_message(), "Token expired");
    }

    #[test]
    fn test_server_error_5xx_is_retryable() {
        let error: QueryError = ClientError::ServerError {
            status: 502,
            message: String::new(),
        }
        .into();
        assert!(error.is_retryable());
    }

    #[test]
    fn test_invalid_response_is_decode() {
        let error: QueryError = ClientError::InvalidResponse("eof".to_string()).into();
        assert_eq!(error, QueryError::Decode("eof".to_string()));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let error: QueryError = ClientError::InvalidInput("bad id".to_string()).into();
        assert_eq!(error.status(), Some(400));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_display() {
        let error = ClientError::ServerError {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "Server returned 500: boom");
    }
}
