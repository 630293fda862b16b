//! Data-access seams the engine reads and writes through.
//!
//! RULE: Engine components never execute SQL. They call these traits,
//! which `CrmStore` implements over SQLite. Every call reads current data;
//! nothing here is cached between calls.

use crate::{
    error::CapacityResult,
    event::BoardEvent,
    profile::{CapacityProfile, Role, TeamMember},
    types::{TeamId, UserId},
    week::WeekWindow,
    work_item::{ItemStatus, KanbanColumn, WorkItem},
};
use serde::{Deserialize, Serialize};

/// Whose board is being shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum BoardScope {
    User(UserId),
    Team(TeamId),
}

/// Read side consumed by the capacity views.
pub trait CapacitySource {
    fn capacity_profile(&self, user_id: &str) -> CapacityResult<Option<CapacityProfile>>;

    /// Items with status NotStarted/InProgress due inside `window`.
    fn count_open_items(&self, user_id: &str, window: &WeekWindow) -> CapacityResult<u32>;

    /// Active members of `team_id` whose role is in `roles`.
    fn list_team_members(&self, team_id: &str, roles: &[Role]) -> CapacityResult<Vec<TeamMember>>;
}

/// Read/write side consumed by the weekly board.
pub trait BoardStore {
    /// Non-cancelled items due inside `window`, ordered by board position.
    fn list_board_items(&self, scope: &BoardScope, window: &WeekWindow)
        -> CapacityResult<Vec<WorkItem>>;

    fn get_item(&self, item_id: &str) -> CapacityResult<Option<WorkItem>>;

    /// Write column, status and position as one atomic update. `position`
    /// is an index into the destination column's sibling order.
    fn update_item_status(
        &self,
        item_id: &str,
        kanban_status: KanbanColumn,
        status: ItemStatus,
        position: i64,
    ) -> CapacityResult<WorkItem>;

    /// Append to the board audit log.
    fn record_board_event(&self, event: &BoardEvent) -> CapacityResult<()>;
}
