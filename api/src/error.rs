//! Error types for the API client

use platter_core::lifecycle::Failure;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when calling the REST API
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The server rejected the credentials (HTTP 401)
    ///
    /// By the time this is returned the stored token has been cleared.
    #[error("Unauthorized")]
    Unauthorized {
        /// Error body returned with the 401, if any
        body: Option<Value>,
    },

    /// The server answered with a non-2xx status
    #[error("API error (status {status}): {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Parsed JSON body, the raw text as a JSON string, or null
        body: Value,
    },

    /// A 2xx body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// The request body could not be serialized
    #[error("Request encoding failed: {0}")]
    Encode(String),
}

impl ApiError {
    /// HTTP status associated with this error, if the server answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Operation-boundary normalization: the server body when there is one,
/// otherwise a generic message.
impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Server { body, .. } | ApiError::Unauthorized { body: Some(body) }
                if !body.is_null() =>
            {
                Self::Server(body)
            },
            ApiError::Server { status, .. } => {
                Self::Message(format!("Request failed with status code {status}"))
            },
            ApiError::Unauthorized { .. } => {
                Self::Message("Request failed with status code 401".to_string())
            },
            other => Self::Message(other.to_string()),
        }
    }
}
