//! Per-user capacity configuration and team membership records.
//!
//! Profiles are owned by user administration; the engine only reads them.

use crate::{
    error::{CapacityError, CapacityResult},
    types::UserId,
};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start_hour: u8, // 0–23
    pub end_hour: u8,   // 0–23, > start_hour
}

impl WorkingHours {
    pub fn hours_per_day(&self) -> u32 {
        self.end_hour.saturating_sub(self.start_hour) as u32
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self { start_hour: 9, end_hour: 17 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityProfile {
    pub user_id: UserId,
    pub max_items_per_week: u32,
    pub working_days: HashSet<Weekday>,
    pub working_hours: WorkingHours,
}

impl CapacityProfile {
    /// Monday–Friday, 09:00–17:00.
    pub fn weekdays(user_id: impl Into<UserId>, max_items_per_week: u32) -> Self {
        Self {
            user_id: user_id.into(),
            max_items_per_week,
            working_days: [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]
            .into_iter()
            .collect(),
            working_hours: WorkingHours::default(),
        }
    }

    /// Checked on write. A zero quota is accepted here but treated as
    /// "not configured" by the evaluator.
    pub fn validate(&self) -> CapacityResult<()> {
        let invalid = |reason: &str| CapacityError::InvalidProfile {
            user_id: self.user_id.clone(),
            reason: reason.to_string(),
        };
        if self.working_days.is_empty() {
            return Err(invalid("working_days must not be empty"));
        }
        let WorkingHours { start_hour, end_hour } = self.working_hours;
        if start_hour > 23 || end_hour > 23 {
            return Err(invalid("working hours must be within 0-23"));
        }
        if start_hour >= end_hour {
            return Err(invalid("working hours start must be before end"));
        }
        Ok(())
    }

    pub fn works_on(&self, day: Weekday) -> bool {
        self.working_days.contains(&day)
    }
}

/// CRM role. Only some roles carry a weekly quota.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SalesRep,
    TeamLead,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SalesRep => "sales_rep",
            Self::TeamLead => "team_lead",
            Self::Admin    => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sales_rep" => Some(Self::SalesRep),
            "team_lead" => Some(Self::TeamLead),
            "admin"     => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub active: bool,
}

/// Weekday names as stored in the profile table (`["mon","tue",...]`).
pub(crate) fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

pub(crate) fn parse_weekday_code(s: &str) -> Option<Weekday> {
    match s {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}
