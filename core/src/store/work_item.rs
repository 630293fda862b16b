use super::{conversion_error, format_due_at, parse_due_at, CrmStore};
use crate::{
    error::{CapacityError, CapacityResult},
    week::WeekWindow,
    work_item::{ItemStatus, KanbanColumn, WorkItem},
};
use rusqlite::{params, OptionalExtension};

const ITEM_COLUMNS: &str =
    "item_id, title, assignee_id, creator_id, due_at, status, kanban_status, board_position";

// Helper function for mapping work item rows
fn item_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkItem> {
    let due_at = match row.get::<_, Option<String>>(4)? {
        Some(raw) => Some(parse_due_at(4, &raw)?),
        None => None,
    };
    let status: String = row.get(5)?;
    let kanban: String = row.get(6)?;
    Ok(WorkItem {
        item_id: row.get(0)?,
        title: row.get(1)?,
        assignee_id: row.get(2)?,
        creator_id: row.get(3)?,
        due_at,
        status: ItemStatus::parse(&status)
            .ok_or_else(|| conversion_error(5, format!("unknown status '{status}'")))?,
        kanban_status: KanbanColumn::parse(&kanban)
            .ok_or_else(|| conversion_error(6, format!("unknown kanban status '{kanban}'")))?,
        position: row.get(7)?,
    })
}

impl CrmStore {
    // ── Work item ──────────────────────────────────────────────────

    pub fn insert_work_item(&self, item: &WorkItem) -> CapacityResult<()> {
        self.conn.execute(
            "INSERT INTO work_item (
                item_id, title, assignee_id, creator_id, due_at,
                status, kanban_status, board_position
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &item.item_id,
                &item.title,
                item.assignee_id.as_deref(),
                &item.creator_id,
                item.due_at.map(format_due_at),
                item.status.as_str(),
                item.kanban_status.as_str(),
                item.position,
            ],
        )?;
        Ok(())
    }

    pub fn get_work_item(&self, item_id: &str) -> CapacityResult<Option<WorkItem>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM work_item WHERE item_id = ?1"),
                params![item_id],
                item_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Open items (not_started / in_progress) assigned to `user_id` and due
    /// inside the inclusive window.
    pub fn count_open_items_due(&self, user_id: &str, window: &WeekWindow) -> CapacityResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM work_item
             WHERE assignee_id = ?1
               AND status IN ('not_started', 'in_progress')
               AND due_at IS NOT NULL
               AND due_at >= ?2 AND due_at <= ?3",
            params![user_id, format_due_at(window.start), format_due_at(window.end)],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    pub fn board_items_for_user(&self, user_id: &str, window: &WeekWindow) -> CapacityResult<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM work_item
             WHERE assignee_id = ?1
               AND status != 'cancelled'
               AND due_at IS NOT NULL
               AND due_at >= ?2 AND due_at <= ?3
             ORDER BY board_position ASC, due_at ASC, item_id ASC"
        ))?;
        let rows = stmt.query_map(
            params![user_id, format_due_at(window.start), format_due_at(window.end)],
            item_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Items assigned to any active member of the team.
    pub fn board_items_for_team(&self, team_id: &str, window: &WeekWindow) -> CapacityResult<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.item_id, w.title, w.assignee_id, w.creator_id, w.due_at,
                    w.status, w.kanban_status, w.board_position
             FROM work_item w
             JOIN team_member tm ON tm.user_id = w.assignee_id
             JOIN crm_user u ON u.user_id = w.assignee_id
             WHERE tm.team_id = ?1
               AND u.active = 1
               AND w.status != 'cancelled'
               AND w.due_at IS NOT NULL
               AND w.due_at >= ?2 AND w.due_at <= ?3
             ORDER BY w.board_position ASC, w.due_at ASC, w.item_id ASC",
        )?;
        let rows = stmt.query_map(
            params![team_id, format_due_at(window.start), format_due_at(window.end)],
            item_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Move an item into `kanban_status` at index `position` in one
    /// transaction. The destination column (same assignee, same week) is
    /// renumbered 0..n with the item inserted at the clamped index.
    pub fn move_work_item(
        &self,
        item_id: &str,
        kanban_status: KanbanColumn,
        status: ItemStatus,
        position: i64,
    ) -> CapacityResult<WorkItem> {
        let tx = self.conn.unchecked_transaction()?;

        let owner: Option<(Option<String>, Option<String>)> = tx
            .query_row(
                "SELECT assignee_id, due_at FROM work_item WHERE item_id = ?1",
                params![item_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((assignee, due_at)) = owner else {
            return Err(CapacityError::ItemNotFound { item_id: item_id.to_string() });
        };
        let week = match due_at {
            Some(raw) => {
                let due = parse_due_at(1, &raw)?;
                Some(WeekWindow::containing(due.date()))
            }
            None => None,
        };

        // Siblings share assignee, column and week with the moved item.
        let mut siblings: Vec<String> = {
            let mut stmt = tx.prepare(
                "SELECT item_id FROM work_item
                 WHERE assignee_id IS ?1
                   AND kanban_status = ?2
                   AND status != 'cancelled'
                   AND item_id != ?3
                   AND ((?4 IS NULL AND due_at IS NULL) OR (due_at >= ?4 AND due_at <= ?5))
                 ORDER BY board_position ASC, due_at ASC, item_id ASC",
            )?;
            let rows = stmt.query_map(
                params![
                    assignee,
                    kanban_status.as_str(),
                    item_id,
                    week.map(|w| format_due_at(w.start)),
                    week.map(|w| format_due_at(w.end)),
                ],
                |row| row.get(0),
            )?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        let index = position.clamp(0, siblings.len() as i64) as usize;
        siblings.insert(index, item_id.to_string());

        for (pos, sibling) in siblings.iter().enumerate() {
            tx.execute(
                "UPDATE work_item SET board_position = ?1 WHERE item_id = ?2",
                params![pos as i64, sibling],
            )?;
        }
        tx.execute(
            "UPDATE work_item SET kanban_status = ?1, status = ?2 WHERE item_id = ?3",
            params![kanban_status.as_str(), status.as_str(), item_id],
        )?;
        tx.commit()?;

        self.get_work_item(item_id)?
            .ok_or_else(|| CapacityError::ItemNotFound { item_id: item_id.to_string() })
    }

    /// Out-of-band status change (cancellation, reopening from another screen).
    /// The board column follows the status unless the item is cancelled.
    pub fn set_item_status(&self, item_id: &str, status: ItemStatus) -> CapacityResult<()> {
        let updated = match status.column() {
            Some(column) => self.conn.execute(
                "UPDATE work_item SET status = ?1, kanban_status = ?2 WHERE item_id = ?3",
                params![status.as_str(), column.as_str(), item_id],
            )?,
            None => self.conn.execute(
                "UPDATE work_item SET status = ?1 WHERE item_id = ?2",
                params![status.as_str(), item_id],
            )?,
        };
        if updated == 0 {
            return Err(CapacityError::ItemNotFound { item_id: item_id.to_string() });
        }
        Ok(())
    }

    pub fn reassign_item(&self, item_id: &str, assignee_id: Option<&str>) -> CapacityResult<()> {
        let updated = self.conn.execute(
            "UPDATE work_item SET assignee_id = ?1 WHERE item_id = ?2",
            params![assignee_id, item_id],
        )?;
        if updated == 0 {
            return Err(CapacityError::ItemNotFound { item_id: item_id.to_string() });
        }
        Ok(())
    }
}
