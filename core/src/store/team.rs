use super::{conversion_error, CrmStore};
use crate::{
    error::CapacityResult,
    profile::{Role, TeamMember},
};
use rusqlite::params;

fn member_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<TeamMember> {
    let role: String = row.get(2)?;
    Ok(TeamMember {
        user_id: row.get(0)?,
        name: row.get(1)?,
        role: Role::parse(&role).ok_or_else(|| conversion_error(2, format!("unknown role '{role}'")))?,
        active: row.get::<_, i32>(3)? != 0,
    })
}

impl CrmStore {
    // ── Users ──────────────────────────────────────────────────────

    pub fn insert_user(&self, user_id: &str, name: &str, role: &Role, active: bool) -> CapacityResult<()> {
        self.conn.execute(
            "INSERT INTO crm_user (user_id, name, role, active) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, name, role.as_str(), if active { 1i32 } else { 0i32 }],
        )?;
        Ok(())
    }

    pub fn set_user_active(&self, user_id: &str, active: bool) -> CapacityResult<()> {
        self.conn.execute(
            "UPDATE crm_user SET active = ?1 WHERE user_id = ?2",
            params![if active { 1i32 } else { 0i32 }, user_id],
        )?;
        Ok(())
    }

    // ── Teams ──────────────────────────────────────────────────────

    pub fn insert_team(&self, team_id: &str, name: &str) -> CapacityResult<()> {
        self.conn.execute(
            "INSERT INTO team (team_id, name) VALUES (?1, ?2)",
            params![team_id, name],
        )?;
        Ok(())
    }

    pub fn add_team_member(&self, team_id: &str, user_id: &str) -> CapacityResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO team_member (team_id, user_id) VALUES (?1, ?2)",
            params![team_id, user_id],
        )?;
        Ok(())
    }

    pub fn remove_team_member(&self, team_id: &str, user_id: &str) -> CapacityResult<()> {
        self.conn.execute(
            "DELETE FROM team_member WHERE team_id = ?1 AND user_id = ?2",
            params![team_id, user_id],
        )?;
        Ok(())
    }

    /// Every member of the team regardless of role or active flag.
    pub fn all_team_members(&self, team_id: &str) -> CapacityResult<Vec<TeamMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.user_id, u.name, u.role, u.active
             FROM team_member tm
             JOIN crm_user u ON u.user_id = tm.user_id
             WHERE tm.team_id = ?1
             ORDER BY u.user_id ASC",
        )?;
        let rows = stmt.query_map(params![team_id], member_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Active members holding one of `roles`, ordered by user id.
    pub fn active_team_members(&self, team_id: &str, roles: &[Role]) -> CapacityResult<Vec<TeamMember>> {
        let members = self.all_team_members(team_id)?;
        Ok(members
            .into_iter()
            .filter(|m| m.active && roles.contains(&m.role))
            .collect())
    }
}
