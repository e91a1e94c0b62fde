//! Error types for surface fetches.

use surface_core::ValidationError;
use thiserror::Error;

/// Message shown to users when the gateway answers with a failure status
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch data";

/// Failure of a single fetch.
///
/// The upstream status is kept for logs only; users see
/// [`FetchError::user_message`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Parameters rejected before sending
    #[error("Invalid parameters: {0}")]
    Validation(#[from] ValidationError),

    /// Gateway could not be reached or the body could not be read
    #[error("Request failed: {0}")]
    Transport(String),

    /// Gateway answered with a non-success status
    #[error("HTTP error! status: {status}")]
    Upstream { status: u16 },

    /// Body is not JSON or lacks expected fields
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Single-line message suitable for end users
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Upstream { .. } => UPSTREAM_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
