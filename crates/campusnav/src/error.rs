//! Error types for backend communication.

use thiserror::Error;

/// Errors produced while talking to the campus navigation backend.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("{0}")]
    Transport(Box<ureq::Error>),

    /// The backend answered with an `{ "error": ... }` payload.
    #[error("{0}")]
    Backend(String),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response from server (expected {0})")]
    Unexpected(&'static str),
}

impl From<ureq::Error> for NavError {
    fn from(e: ureq::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

/// Result alias for backend operations.
pub type Result<T> = std::result::Result<T, NavError>;
