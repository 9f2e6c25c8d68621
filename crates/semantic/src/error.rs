use thiserror::Error;

/// Failures while turning query text into a vector.
///
/// None of these are ever converted into a zero or placeholder vector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    /// Configuration is inconsistent (missing URL, unknown mode, zero dimensions).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The request never produced an HTTP response (connect failure, timeout).
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The provider answered with a non-success status.
    #[error("embedding provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body had no usable numeric vector.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
    /// The provider returned a zero-length vector.
    #[error("embedding provider returned an empty vector")]
    EmptyVector,
}

impl SemanticError {
    /// Transport failures, throttling and server-side errors are worth another
    /// attempt. Client errors and bad payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SemanticError::Request(_) => true,
            SemanticError::Status { status, .. } => *status == 429 || *status >= 500,
            SemanticError::InvalidConfig(_)
            | SemanticError::MalformedResponse(_)
            | SemanticError::EmptyVector => false,
        }
    }
}
