use super::{conversion_error, CrmStore};
use crate::{
    error::CapacityResult,
    profile::{parse_weekday_code, weekday_code, CapacityProfile, WorkingHours},
};
use rusqlite::{params, OptionalExtension};

impl CrmStore {
    // ── Capacity profile ──────────────────────────────────────────

    /// Insert or replace a user's profile. Malformed profiles are rejected.
    pub fn upsert_capacity_profile(&self, profile: &CapacityProfile) -> CapacityResult<()> {
        profile.validate()?;

        let mut days: Vec<_> = profile.working_days.iter().copied().collect();
        days.sort_by_key(|d| d.num_days_from_monday());
        let codes: Vec<&str> = days.into_iter().map(weekday_code).collect();
        let days_json = serde_json::to_string(&codes)?;

        self.conn.execute(
            "INSERT INTO capacity_profile
                (user_id, max_items_per_week, working_days, work_start_hour, work_end_hour)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                max_items_per_week = excluded.max_items_per_week,
                working_days       = excluded.working_days,
                work_start_hour    = excluded.work_start_hour,
                work_end_hour      = excluded.work_end_hour",
            params![
                &profile.user_id,
                profile.max_items_per_week as i64,
                days_json,
                profile.working_hours.start_hour as i64,
                profile.working_hours.end_hour as i64,
            ],
        )?;
        Ok(())
    }

    pub fn delete_capacity_profile(&self, user_id: &str) -> CapacityResult<()> {
        self.conn.execute(
            "DELETE FROM capacity_profile WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    pub fn get_capacity_profile(&self, user_id: &str) -> CapacityResult<Option<CapacityProfile>> {
        self.conn
            .query_row(
                "SELECT user_id, max_items_per_week, working_days, work_start_hour, work_end_hour
                 FROM capacity_profile WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let days_json: String = row.get(2)?;
                    let codes: Vec<String> = serde_json::from_str(&days_json)
                        .map_err(|e| conversion_error(2, e.to_string()))?;
                    let working_days = codes
                        .iter()
                        .map(|c| {
                            parse_weekday_code(c)
                                .ok_or_else(|| conversion_error(2, format!("unknown weekday '{c}'")))
                        })
                        .collect::<Result<_, _>>()?;
                    Ok(CapacityProfile {
                        user_id: row.get(0)?,
                        max_items_per_week: row.get::<_, i64>(1)?.max(0) as u32,
                        working_days,
                        working_hours: WorkingHours {
                            start_hour: row.get::<_, i64>(3)? as u8,
                            end_hour: row.get::<_, i64>(4)? as u8,
                        },
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}
