//! Error types for the chat client.
//!
//! Every variant ends up collapsed into the same user-facing apology in the
//! transcript; the detail only ever reaches the log.

use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Endpoint unreachable, connection reset, or any other transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body was not JSON.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The staged file could not be read when the request was built.
    #[error("could not read attachment {path:?}: {source}")]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config loading or saving failed.
    #[error("config error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn attachment(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Attachment {
            path: path.into(),
            source,
        }
    }
}
