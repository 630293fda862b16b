//! Team capacity rollup.
//!
//! Only active members whose role participates in capacity tracking are
//! evaluated. Members without a profile drop out silently. Member order is
//! the source's member order (user id), so it is stable within a call.

use crate::{
    capacity::{capacity_percentage, CapacityEvaluator, CapacityInfo, Thresholds},
    error::CapacityResult,
    profile::Role,
    source::CapacitySource,
    types::TeamId,
    week::WeekWindow,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCapacity {
    pub team_id: TeamId,
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub members: Vec<CapacityInfo>,
    pub total_capacity: u64,
    pub total_usage: u64,
    pub team_percentage: u32,
}

impl TeamCapacity {
    /// Sum the member list. A team with no capacity reports 0%.
    pub fn from_members(team_id: impl Into<TeamId>, window: &WeekWindow, members: Vec<CapacityInfo>) -> Self {
        let total_capacity: u64 = members.iter().map(|m| u64::from(m.max_items_per_week)).sum();
        let total_usage: u64 = members.iter().map(|m| u64::from(m.current_week_items)).sum();
        Self {
            team_id: team_id.into(),
            week_start: window.start,
            week_end: window.end,
            members,
            total_capacity,
            total_usage,
            team_percentage: capacity_percentage(total_usage, total_capacity).unwrap_or(0),
        }
    }

    pub fn member(&self, user_id: &str) -> Option<&CapacityInfo> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn available_slots(&self) -> u64 {
        self.members.iter().map(|m| u64::from(m.available_slots)).sum()
    }
}

pub struct TeamCapacityAggregator<'a, S: CapacitySource + ?Sized> {
    source: &'a S,
    thresholds: Thresholds,
    eligible_roles: &'a [Role],
}

impl<'a, S: CapacitySource + ?Sized> TeamCapacityAggregator<'a, S> {
    pub fn new(source: &'a S, thresholds: Thresholds, eligible_roles: &'a [Role]) -> Self {
        Self {
            source,
            thresholds,
            eligible_roles,
        }
    }

    pub fn aggregate(&self, team_id: &str, window: &WeekWindow) -> CapacityResult<TeamCapacity> {
        let evaluator = CapacityEvaluator::new(self.source, self.thresholds);
        let eligible = self.source.list_team_members(team_id, self.eligible_roles)?;

        let mut members = Vec::with_capacity(eligible.len());
        for member in &eligible {
            if let Some(info) = evaluator.evaluate(&member.user_id, window)? {
                members.push(info);
            }
        }

        let team = TeamCapacity::from_members(team_id, window, members);
        log::debug!(
            "week={} team={team_id}: {} of {} eligible members configured, usage {}/{} ({}%)",
            window.monday(),
            team.members.len(),
            eligible.len(),
            team.total_usage,
            team.total_capacity,
            team.team_percentage
        );
        Ok(team)
    }
}
