//! Typed error hierarchy for the board engine.
//!
//! One enum, `BoardError`, covers the failure classes a board view has to
//! react to:
//! - validation failures, rejected before any request is sent
//! - WIP conflicts, reported with the server's `WipStatus`
//! - network and server failures, which trigger a resync
//! - missing boards or tasks, handled by the surrounding page

use flowboard_common::WipStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Column {column_id} does not exist on board {board_id}")]
    UnknownColumn { board_id: String, column_id: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error(
        "Column '{}' is at its WIP limit ({}/{})",
        .0.column_name,
        .0.current_count,
        .0.wip_limit.map(|l| l.to_string()).unwrap_or_else(|| "-".into())
    )]
    WipConflict(WipStatus),

    #[error("Task {id} not found")]
    TaskNotFound { id: String },

    #[error("Board {id} not found")]
    BoardNotFound { id: String },

    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Realtime channel error: {0}")]
    Realtime(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BoardError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BoardError::TaskNotFound { .. } | BoardError::BoardNotFound { .. }
        )
    }

    /// Failures that mean local state may have diverged from the server.
    pub fn requires_resync(&self) -> bool {
        matches!(
            self,
            BoardError::Network(_) | BoardError::Server { .. } | BoardError::Decode(_)
        )
    }

    /// Short text suitable for a toast or status line.
    pub fn user_message(&self) -> String {
        match self {
            BoardError::WipConflict(status) => format!(
                "'{}' is full. Move anyway to exceed its WIP limit.",
                status.column_name
            ),
            BoardError::Server { message, .. } if !message.is_empty() => {
                format!("Move failed: {}", message)
            }
            BoardError::Server { status, .. } => format!("Move failed (HTTP {})", status),
            other => format!("Move failed: {}", other),
        }
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Decode(err)
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
