//! Board audit events.
//!
//! Every committed move and every forced reconciliation is recorded so the
//! history of an item's column changes can be replayed.
//! Variants are added over time, never removed or reordered.

use crate::{types::ItemId, work_item::KanbanColumn};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    ItemMoved {
        item_id: ItemId,
        from: KanbanColumn,
        to: KanbanColumn,
        position: i64,
        moved_on: NaiveDate,
    },
    /// A move failed and the caller's view was rebuilt from the store.
    MoveReconciled {
        item_id: ItemId,
        reason: String,
    },
}

impl BoardEvent {
    pub fn item_id(&self) -> &str {
        match self {
            Self::ItemMoved { item_id, .. } | Self::MoveReconciled { item_id, .. } => item_id,
        }
    }

    /// Stable name for the event_type column in board_event.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ItemMoved { .. }      => "item_moved",
            Self::MoveReconciled { .. } => "move_reconciled",
        }
    }
}

/// The audit entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEventEntry {
    pub id: Option<i64>,
    pub item_id: ItemId,
    pub event_type: String,
    pub payload: String, // JSON-serialized BoardEvent
}

impl BoardEventEntry {
    pub fn from_event(event: &BoardEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            item_id: event.item_id().to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }

    pub fn decode(&self) -> serde_json::Result<BoardEvent> {
        serde_json::from_str(&self.payload)
    }
}
