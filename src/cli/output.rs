//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{SyncError, TransportError};

/// Map domain errors to a string for CLI output. Server-reported failures
/// show the server's own message.
pub fn map_error(e: &SyncError) -> String {
    match e {
        SyncError::Transport(TransportError::Status { status, .. }) => {
            let message = e
                .transport()
                .and_then(TransportError::server_message)
                .unwrap_or_default();
            format!("Server error ({}): {}", status, message)
        }
        SyncError::Transport(TransportError::Network(detail)) => {
            format!("Workspace server unreachable: {}", detail)
        }
        other => other.to_string(),
    }
}

/// Process exit code for an error category.
pub fn exit_code(e: &SyncError) -> i32 {
    match e {
        SyncError::Config(_) | SyncError::FallbackTree(_) => 2,
        SyncError::PathBusy(_) => 3,
        SyncError::Transport(_) => 4,
        SyncError::InvalidUpload(_) | SyncError::Io { .. } => 1,
    }
}
