use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures inside the collector and settings loader.
///
/// None of these escape the public operations; they are logged and replaced
/// with an empty or prior value at the module boundary.
#[derive(Debug, Error)]
pub enum StatuslineError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("`{command}` exited with {status}")]
    CommandFailed { command: String, status: String },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatuslineError>;
