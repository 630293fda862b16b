use crate::work_item::KanbanColumn;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapacityError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Work item '{item_id}' not found")]
    ItemNotFound { item_id: String },

    #[error("Work item '{item_id}' is in {actual:?}, caller expected {expected:?}")]
    ColumnConflict {
        item_id: String,
        expected: KanbanColumn,
        actual: KanbanColumn,
    },

    #[error("Work item '{item_id}' is cancelled and not on the board")]
    NotOnBoard { item_id: String },

    #[error("Invalid capacity profile for '{user_id}': {reason}")]
    InvalidProfile { user_id: String, reason: String },

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CapacityError {
    /// True for failures the caller recovers from by re-fetching board state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ColumnConflict { .. } | Self::NotOnBoard { .. })
    }
}

pub type CapacityResult<T> = Result<T, CapacityError>;
