//! Assignment selection: who should receive the next work item.
//!
//! Greedy and stateless: the pick is advisory and reserves nothing. Two
//! callers picking back to back without committing in between can get the
//! same candidate. Callers that need admission control re-check with
//! `can_assign` right before writing.

use crate::{
    capacity::{CapacityEvaluator, CapacityInfo, Thresholds},
    error::CapacityResult,
    profile::Role,
    source::CapacitySource,
    team_capacity::TeamCapacityAggregator,
    week::WeekWindow,
};
use serde::{Deserialize, Serialize};

/// Why an assignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No profile (or a zero quota): a data problem.
    NoProfile,
    /// Quota used up for the week: a business rule.
    AtCapacity,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoProfile  => "user has no capacity profile configured",
            Self::AtCapacity => "user has no capacity slots left this week",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub allowed: bool,
    pub available_slots: u32,
    pub reason: Option<DenialReason>,
}

impl AssignmentDecision {
    pub fn from_capacity(info: Option<&CapacityInfo>) -> Self {
        match info {
            None => Self {
                allowed: false,
                available_slots: 0,
                reason: Some(DenialReason::NoProfile),
            },
            Some(info) if info.available_slots == 0 => Self {
                allowed: false,
                available_slots: 0,
                reason: Some(DenialReason::AtCapacity),
            },
            Some(info) => Self {
                allowed: true,
                available_slots: info.available_slots,
                reason: None,
            },
        }
    }
}

/// Order candidates best-first: most free slots, then least current load.
/// The sort is stable, so equal candidates keep member order.
pub fn rank_candidates(members: &[CapacityInfo]) -> Vec<&CapacityInfo> {
    let mut ranked: Vec<&CapacityInfo> = members.iter().collect();
    ranked.sort_by(|a, b| {
        b.available_slots
            .cmp(&a.available_slots)
            .then(a.current_week_items.cmp(&b.current_week_items))
    });
    ranked
}

/// The top-ranked member, if it still has a free slot.
pub fn best_candidate(members: &[CapacityInfo]) -> Option<&CapacityInfo> {
    rank_candidates(members)
        .into_iter()
        .next()
        .filter(|m| m.available_slots > 0)
}

pub struct AssignmentSelector<'a, S: CapacitySource + ?Sized> {
    source: &'a S,
    thresholds: Thresholds,
    eligible_roles: &'a [Role],
}

impl<'a, S: CapacitySource + ?Sized> AssignmentSelector<'a, S> {
    pub fn new(source: &'a S, thresholds: Thresholds, eligible_roles: &'a [Role]) -> Self {
        Self {
            source,
            thresholds,
            eligible_roles,
        }
    }

    pub fn can_assign(&self, user_id: &str, window: &WeekWindow) -> CapacityResult<AssignmentDecision> {
        let info = CapacityEvaluator::new(self.source, self.thresholds).evaluate(user_id, window)?;
        let decision = AssignmentDecision::from_capacity(info.as_ref());
        if let Some(reason) = decision.reason {
            log::debug!("week={} assign: {user_id} refused: {}", window.monday(), reason.message());
        }
        Ok(decision)
    }

    pub fn pick_best_candidate(&self, team_id: &str, window: &WeekWindow) -> CapacityResult<Option<CapacityInfo>> {
        let team = TeamCapacityAggregator::new(self.source, self.thresholds, self.eligible_roles)
            .aggregate(team_id, window)?;

        let pick = best_candidate(&team.members).cloned();
        match &pick {
            Some(candidate) => log::info!(
                "week={} team={team_id}: best candidate {} ({} slots free, {} items)",
                window.monday(),
                candidate.user_id,
                candidate.available_slots,
                candidate.current_week_items
            ),
            None => log::info!(
                "week={} team={team_id}: no candidate available ({} members, all saturated)",
                window.monday(),
                team.members.len()
            ),
        }
        Ok(pick)
    }
}
