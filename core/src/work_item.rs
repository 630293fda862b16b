//! Work items (tasks and calls) and the two status fields the engine reads.
//!
//! `status` is the lifecycle field capacity accounting reads.
//! `kanban_status` is the board column. The two are kept in step by the
//! board move operation: Todo <-> NotStarted, InProgress <-> InProgress,
//! Completed <-> Done. Cancelled items have no column.

use crate::types::{ItemId, UserId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Done,
    Cancelled,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Done       => "done",
            Self::Cancelled  => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "done"        => Some(Self::Done),
            "cancelled"   => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Open items count toward weekly capacity.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::NotStarted | Self::InProgress)
    }

    /// The board column this status lives in. Cancelled has none.
    pub fn column(&self) -> Option<KanbanColumn> {
        match self {
            Self::NotStarted => Some(KanbanColumn::Todo),
            Self::InProgress => Some(KanbanColumn::InProgress),
            Self::Done       => Some(KanbanColumn::Completed),
            Self::Cancelled  => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KanbanColumn {
    Todo,
    InProgress,
    Completed,
}

impl KanbanColumn {
    pub const ALL: [KanbanColumn; 3] = [Self::Todo, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo       => "todo",
            Self::InProgress => "in_progress",
            Self::Completed  => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo"        => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "completed"   => Some(Self::Completed),
            _ => None,
        }
    }

    /// The lifecycle status written alongside this column on a move.
    pub fn status(&self) -> ItemStatus {
        match self {
            Self::Todo       => ItemStatus::NotStarted,
            Self::InProgress => ItemStatus::InProgress,
            Self::Completed  => ItemStatus::Done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub item_id: ItemId,
    pub title: String,
    pub assignee_id: Option<UserId>,
    pub creator_id: UserId,
    pub due_at: Option<NaiveDateTime>,
    pub status: ItemStatus,
    pub kanban_status: KanbanColumn,
    pub position: i64,
}

impl WorkItem {
    /// A fresh item in the Todo column.
    pub fn new(
        title: impl Into<String>,
        creator_id: impl Into<UserId>,
        assignee_id: Option<UserId>,
        due_at: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            item_id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            assignee_id,
            creator_id: creator_id.into(),
            due_at,
            status: ItemStatus::NotStarted,
            kanban_status: KanbanColumn::Todo,
            position: 0,
        }
    }

    /// Start the item in another column (already in progress or done).
    pub fn in_column(mut self, column: KanbanColumn) -> Self {
        self.kanban_status = column;
        self.status = column.status();
        self
    }

    pub fn with_id(mut self, item_id: impl Into<ItemId>) -> Self {
        self.item_id = item_id.into();
        self
    }

    pub fn at_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    /// The column the item currently shows in, if any.
    pub fn board_column(&self) -> Option<KanbanColumn> {
        if self.status == ItemStatus::Cancelled {
            None
        } else {
            Some(self.kanban_status)
        }
    }
}
