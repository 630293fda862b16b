use super::CrmStore;
use crate::{error::CapacityResult, event::BoardEventEntry};
use rusqlite::params;

impl CrmStore {
    // ── Board event log ────────────────────────────────────────────

    pub fn append_board_event(&self, entry: &BoardEventEntry) -> CapacityResult<()> {
        self.conn.execute(
            "INSERT INTO board_event (item_id, event_type, payload) VALUES (?1, ?2, ?3)",
            params![entry.item_id, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    pub fn board_events_for_item(&self, item_id: &str) -> CapacityResult<Vec<BoardEventEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, event_type, payload
             FROM board_event WHERE item_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![item_id], |row| {
                Ok(BoardEventEntry {
                    id: Some(row.get(0)?),
                    item_id: row.get(1)?,
                    event_type: row.get(2)?,
                    payload: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
