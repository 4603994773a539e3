use thiserror::Error;

/// Errors from the remote classification backend.
///
/// The pipeline never propagates these past a chunk boundary: a failed chunk
/// degrades to verbatim TEXT records instead.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The HTTP request itself failed.
    #[error("backend request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-success status.
    #[error("backend responded with error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error body from the API
        message: String,
    },

    /// The response carried no usable structured output.
    #[error("backend returned no structured output")]
    EmptyResponse,

    /// The structured output did not parse as candidate records.
    #[error("failed to parse backend output: {0}")]
    ParseError(String),

    /// Required configuration is missing.
    #[error("backend configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::RequestFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::ApiError {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backend responded with error: 429 - rate limited"
        );
    }
}
