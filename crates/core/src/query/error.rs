use thiserror::Error;

/// Message shown when the backend did not provide one.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors surfaced by queries and mutations.
///
/// The variants are the error taxonomy the retry policy works on; see
/// [`QueryError::is_retryable`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("Not found: {message}")]
    NotFound { message: String },
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Fetch aborted: {0}")]
    Aborted(String),
}

/// Result type for query and mutation operations.
pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    /// Maps an HTTP status and message to an error variant.
    ///
    /// - 401 -> `Unauthorized`
    /// - 404 -> `NotFound`
    /// - 408, 429, 5xx -> `Server` (transient)
    /// - any other status -> `Rejected`
    ///
    /// # Examples
    ///
    /// ```
    /// use campusync_core::query::QueryError;
    ///
    /// let error = QueryError::from_status(503, "maintenance");
    /// assert!(error.is_retryable());
    /// assert_eq!(error.status(), Some(503));
    /// ```
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => QueryError::Unauthorized { message },
            404 => QueryError::NotFound { message },
            408 | 429 | 500..=599 => QueryError::Server { status, message },
            _ => QueryError::Rejected { status, message },
        }
    }

    /// Returns the HTTP status this error carries, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::Unauthorized { .. } => Some(401),
            QueryError::NotFound { .. } => Some(404),
            QueryError::Rejected { status, .. } | QueryError::Server { status, .. } => {
                Some(*status)
            }
            QueryError::Network(_) | QueryError::Decode(_) | QueryError::Aborted(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, QueryError::Unauthorized { .. })
    }

    /// Transient failures (transport errors and server-side statuses) may
    /// succeed on a later attempt; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Server { .. } | QueryError::Network(_))
    }

    /// The message to show a user: the backend's message when there is one,
    /// otherwise a generic fallback.
    pub fn user_message(&self) -> String {
        let message = match self {
            QueryError::Unauthorized { message }
            | QueryError::NotFound { message }
            | QueryError::Rejected { message, .. }
            | QueryError::Server { message, .. } => message.as_str(),
            QueryError::Network(_) | QueryError::Decode(_) | QueryError::Aborted(_) => "",
        };
        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_maps_to_unauthorized() {
        let error = QueryError::from_status(401, "Session expired");
        assert!(error.is_unauthorized());
        assert!(!error.is_retryable());
        assert_eq!(error.status(), Some(401));
    }

    #[test]
    fn test_404_maps_to_not_found() {
        let error = QueryError::from_status(404, "Assignment not found");
        assert_eq!(
            error,
            QueryError::NotFound {
                message: "Assignment not found".to_string()
            }
        );
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_4xx_maps_to_rejected() {
        for status in [400, 403, 409, 422] {
            let error = QueryError::from_status(status, "bad");
            assert!(matches!(error, QueryError::Rejected { .. }), "{}", status);
            assert!(!error.is_retryable());
        }
    }

    #[test]
    fn test_transient_statuses_are_retryable() {
        for status in [408, 429, 500, 502, 503, 504] {
            let error = QueryError::from_status(status, "oops");
            assert!(matches!(error, QueryError::Server { .. }), "{}", status);
            assert!(error.is_retryable());
        }
    }

    #[test]
    fn test_network_is_retryable_decode_is_not() {
        assert!(QueryError::Network("connection reset".to_string()).is_retryable());
        assert!(!QueryError::Decode("missing field".to_string()).is_retryable());
        assert!(!QueryError::Aborted("panicked".to_string()).is_retryable());
    }

    #[test]
    fn test_user_message_prefers_backend_message() {
        let error = QueryError::from_status(422, "Due date must be in the future");
        assert_eq!(error.user_message(), "Due date must be in the future");
    }

    #[test]
    fn test_user_message_fallback() {
        assert_eq!(
            QueryError::from_status(500, "  ").user_message(),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            QueryError::Network("dns".to_string()).user_message(),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_display() {
        let error = QueryError::from_status(500, "boom");
        assert_eq!(error.to_string(), "Server error (500): boom");
    }
}
