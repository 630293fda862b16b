//! Capacity evaluation: one user's load in one week.
//!
//! Design:
//!   - current = open items due inside the week window
//!   - available_slots = max(0, quota − current)
//!   - percentage = round(100 × current / quota), half rounds up
//!   - status (first match wins):
//!       current > quota               → overloaded
//!       current = quota or pct ≥ full → full
//!       pct ≥ moderate                → moderate
//!       otherwise                     → available
//!
//! Nothing is cached; every call re-reads the source.

use crate::{
    config::EngineConfig,
    error::CapacityResult,
    source::CapacitySource,
    types::UserId,
    week::WeekWindow,
};
use serde::{Deserialize, Serialize};

/// Load classification, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityStatus {
    Available,
    Moderate,
    Full,
    Overloaded,
}

impl CapacityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available  => "available",
            Self::Moderate   => "moderate",
            Self::Full       => "full",
            Self::Overloaded => "overloaded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub moderate_pct: u32,
    pub full_pct: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { moderate_pct: 75, full_pct: 100 }
    }
}

impl From<&EngineConfig> for Thresholds {
    fn from(config: &EngineConfig) -> Self {
        Self {
            moderate_pct: config.moderate_threshold_pct,
            full_pct: config.full_threshold_pct,
        }
    }
}

/// `round(100 × current / max)`. None when `max` is zero.
/// Saturates at `u32::MAX` for absurd ratios.
pub fn capacity_percentage(current: u64, max: u64) -> Option<u32> {
    if max == 0 {
        return None;
    }
    let (current, max) = (current as u128, max as u128);
    let pct = (200 * current + max) / (2 * max);
    Some(u32::try_from(pct).unwrap_or(u32::MAX))
}

/// Full and overloaded follow the raw counts, so the status always agrees
/// with `available_slots` whatever the thresholds are.
pub fn classify(percentage: u32, current: u32, max: u32, thresholds: &Thresholds) -> CapacityStatus {
    if current > max {
        CapacityStatus::Overloaded
    } else if current == max || percentage >= thresholds.full_pct {
        CapacityStatus::Full
    } else if percentage >= thresholds.moderate_pct {
        CapacityStatus::Moderate
    } else {
        CapacityStatus::Available
    }
}

/// Derived read model. Recomputed on every query, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityInfo {
    pub user_id: UserId,
    pub max_items_per_week: u32,
    pub current_week_items: u32,
    pub available_slots: u32,
    pub capacity_percentage: u32,
    pub status: CapacityStatus,
}

impl CapacityInfo {
    /// None for a zero quota, which counts as "not configured".
    pub fn compute(
        user_id: impl Into<UserId>,
        max_items_per_week: u32,
        current_week_items: u32,
        thresholds: &Thresholds,
    ) -> Option<Self> {
        let capacity_percentage =
            capacity_percentage(current_week_items.into(), max_items_per_week.into())?;
        Some(Self {
            user_id: user_id.into(),
            max_items_per_week,
            current_week_items,
            available_slots: max_items_per_week.saturating_sub(current_week_items),
            capacity_percentage,
            status: classify(
                capacity_percentage,
                current_week_items,
                max_items_per_week,
                thresholds,
            ),
        })
    }

    pub fn is_over_quota(&self) -> bool {
        self.current_week_items > self.max_items_per_week
    }
}

/// Evaluates a single user's capacity against a source.
pub struct CapacityEvaluator<'a, S: CapacitySource + ?Sized> {
    source: &'a S,
    thresholds: Thresholds,
}

impl<'a, S: CapacitySource + ?Sized> CapacityEvaluator<'a, S> {
    pub fn new(source: &'a S, thresholds: Thresholds) -> Self {
        Self { source, thresholds }
    }

    /// Ok(None) when the user has no profile or a zero quota.
    pub fn evaluate(&self, user_id: &str, window: &WeekWindow) -> CapacityResult<Option<CapacityInfo>> {
        let Some(profile) = self.source.capacity_profile(user_id)? else {
            log::debug!("week={} capacity: {user_id} has no profile", window.monday());
            return Ok(None);
        };
        if profile.max_items_per_week == 0 {
            log::debug!("week={} capacity: {user_id} has a zero quota", window.monday());
            return Ok(None);
        }

        let current = self.source.count_open_items(user_id, window)?;
        let info = CapacityInfo::compute(user_id, profile.max_items_per_week, current, &self.thresholds);
        if let Some(info) = &info {
            log::debug!(
                "week={} capacity: {user_id} {}/{} ({}%) {}",
                window.monday(),
                info.current_week_items,
                info.max_items_per_week,
                info.capacity_percentage,
                info.status.as_str()
            );
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(max: u32, current: u32) -> CapacityInfo {
        CapacityInfo::compute("u-1", max, current, &Thresholds::default()).unwrap()
    }

    #[test]
    fn exactly_at_quota_is_full() {
        let info = info(5, 5);
        assert_eq!(info.capacity_percentage, 100);
        assert_eq!(info.status, CapacityStatus::Full);
        assert_eq!(info.available_slots, 0);
    }

    #[test]
    fn over_quota_is_overloaded() {
        let info = info(5, 7);
        assert_eq!(info.capacity_percentage, 140);
        assert_eq!(info.status, CapacityStatus::Overloaded);
        assert_eq!(info.available_slots, 0);
        assert!(info.is_over_quota());
    }

    #[test]
    fn moderate_band_starts_at_75_percent() {
        assert_eq!(info(4, 3).status, CapacityStatus::Moderate);
        assert_eq!(info(100, 74).status, CapacityStatus::Available);
        assert_eq!(info(100, 75).status, CapacityStatus::Moderate);
        assert_eq!(info(100, 99).status, CapacityStatus::Moderate);
    }

    #[test]
    fn empty_week_is_available() {
        let info = info(10, 0);
        assert_eq!(info.capacity_percentage, 0);
        assert_eq!(info.status, CapacityStatus::Available);
        assert_eq!(info.available_slots, 10);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(capacity_percentage(1, 8), Some(13)); // 12.5
        assert_eq!(capacity_percentage(1, 3), Some(33));
        assert_eq!(capacity_percentage(2, 3), Some(67));
        assert_eq!(capacity_percentage(3, 0), None);
    }

    #[test]
    fn zero_quota_is_not_configured() {
        assert!(CapacityInfo::compute("u-1", 0, 0, &Thresholds::default()).is_none());
    }

    #[test]
    fn slots_and_usage_add_up_to_quota() {
        for max in 1..=12u32 {
            for current in 0..=20u32 {
                let info = info(max, current);
                assert_eq!(info.available_slots + current.min(max), max);
                if current >= max {
                    assert_eq!(info.available_slots, 0);
                }
            }
        }
    }

    #[test]
    fn classification_is_monotone_in_load() {
        for max in 1..=12u32 {
            let mut prev = CapacityStatus::Available;
            for current in 0..=30u32 {
                let status = info(max, current).status;
                assert!(status >= prev, "max={max} current={current}");
                prev = status;
            }
        }
    }

    #[test]
    fn at_quota_is_full_even_with_a_high_full_threshold() {
        let thresholds = Thresholds { moderate_pct: 75, full_pct: 120 };
        let at_quota = CapacityInfo::compute("u-1", 5, 5, &thresholds).unwrap();
        assert_eq!(at_quota.status, CapacityStatus::Full);
        assert_eq!(at_quota.available_slots, 0);

        let over = CapacityInfo::compute("u-1", 10, 11, &thresholds).unwrap();
        assert_eq!(over.capacity_percentage, 110);
        assert_eq!(over.status, CapacityStatus::Overloaded);
    }

    #[test]
    fn huge_counts_do_not_truncate_the_percentage() {
        assert_eq!(capacity_percentage(u64::from(u32::MAX) * 2, 1), Some(u32::MAX));
        assert_eq!(capacity_percentage(u64::from(u32::MAX), u64::from(u32::MAX)), Some(100));
        let info = info(u32::MAX, u32::MAX);
        assert_eq!(info.status, CapacityStatus::Full);
    }

    #[test]
    fn custom_thresholds_move_the_bands() {
        let thresholds = Thresholds { moderate_pct: 50, full_pct: 90 };
        let info = CapacityInfo::compute("u-1", 10, 9, &thresholds).unwrap();
        assert_eq!(info.status, CapacityStatus::Full);
        assert_eq!(info.available_slots, 1);
    }
}
