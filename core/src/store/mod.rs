//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Engine components go through the `CapacitySource` / `BoardStore`
//! traits and never execute SQL directly.

mod board_event;
mod profile;
mod team;
mod work_item;

use crate::{
    error::CapacityResult,
    event::{BoardEvent, BoardEventEntry},
    profile::{CapacityProfile, Role, TeamMember},
    source::{BoardScope, BoardStore, CapacitySource},
    week::WeekWindow,
    work_item::{ItemStatus, KanbanColumn, WorkItem},
};
use chrono::NaiveDateTime;
use rusqlite::Connection;

/// Fixed-width so that text comparison in SQL matches time order.
pub(crate) const DUE_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub struct CrmStore {
    conn: Connection,
}

impl CrmStore {
    pub fn open(path: &str) -> CapacityResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CapacityResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> CapacityResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_capacity.sql"))?;
        Ok(())
    }
}

pub(crate) fn format_due_at(at: NaiveDateTime) -> String {
    at.format(DUE_AT_FORMAT).to_string()
}

pub(crate) fn parse_due_at(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DUE_AT_FORMAT)
        .map_err(|e| conversion_error(idx, format!("bad due_at '{raw}': {e}")))
}

pub(crate) fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

// ── Engine seams ───────────────────────────────────────────────────

impl CapacitySource for CrmStore {
    fn capacity_profile(&self, user_id: &str) -> CapacityResult<Option<CapacityProfile>> {
        self.get_capacity_profile(user_id)
    }

    fn count_open_items(&self, user_id: &str, window: &WeekWindow) -> CapacityResult<u32> {
        self.count_open_items_due(user_id, window)
    }

    fn list_team_members(&self, team_id: &str, roles: &[Role]) -> CapacityResult<Vec<TeamMember>> {
        self.active_team_members(team_id, roles)
    }
}

impl BoardStore for CrmStore {
    fn list_board_items(&self, scope: &BoardScope, window: &WeekWindow) -> CapacityResult<Vec<WorkItem>> {
        match scope {
            BoardScope::User(user_id) => self.board_items_for_user(user_id, window),
            BoardScope::Team(team_id) => self.board_items_for_team(team_id, window),
        }
    }

    fn get_item(&self, item_id: &str) -> CapacityResult<Option<WorkItem>> {
        self.get_work_item(item_id)
    }

    fn update_item_status(
        &self,
        item_id: &str,
        kanban_status: KanbanColumn,
        status: ItemStatus,
        position: i64,
    ) -> CapacityResult<WorkItem> {
        self.move_work_item(item_id, kanban_status, status, position)
    }

    fn record_board_event(&self, event: &BoardEvent) -> CapacityResult<()> {
        self.append_board_event(&BoardEventEntry::from_event(event)?)
    }
}
