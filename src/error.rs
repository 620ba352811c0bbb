//! Error types for the treesync workspace client.

use thiserror::Error;

/// Transport-level failures, normalized into a single channel.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server answered with a non-2xx status. `detail` is the raw response body.
    #[error("Server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl TransportError {
    /// HTTP status code when the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided error detail. Prefers the `message` field of a JSON
    /// error body, falling back to the raw body.
    pub fn server_message(&self) -> Option<String> {
        match self {
            TransportError::Status { detail, .. } => {
                let parsed = serde_json::from_str::<serde_json::Value>(detail).ok();
                let message = parsed
                    .as_ref()
                    .and_then(|v| v.get("message"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                Some(message.unwrap_or_else(|| detail.clone()))
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::Client(err.to_string())
        } else if err.is_decode() {
            TransportError::Malformed(err.to_string())
        } else if err.is_timeout() {
            TransportError::Network(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            TransportError::Network(format!("Connection error: {}", err))
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Errors surfaced by the synchronization core.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Another mutation touching an overlapping path is still in flight.
    #[error("Path is busy with another mutation: {0}")]
    PathBusy(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fallback tree: {0}")]
    FallbackTree(String),
}

impl SyncError {
    /// The underlying transport failure, if this error came from the wire.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            SyncError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::Config(err.to_string())
    }
}
