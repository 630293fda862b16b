//! Week windows: Monday 00:00:00.000 through Sunday 23:59:59.999.
//!
//! Weeks are always Monday-first. A Sunday is the last day of its week,
//! never the first day of the next one. Only local calendar fields are
//! used; there is no timezone handling.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Monday 00:00:00 of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDateTime {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    monday.and_time(NaiveTime::MIN)
}

/// Sunday 23:59:59.999 of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDateTime {
    week_start(date) + Duration::days(7) - Duration::milliseconds(1)
}

/// The inclusive `[start, end]` range of one calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekWindow {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: week_start(date),
            end: week_end(date),
        }
    }

    /// The Monday this window starts on.
    pub fn monday(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn next(&self) -> Self {
        Self::containing(self.monday() + Duration::days(7))
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.monday() - Duration::days(7))
    }
}

impl std::fmt::Display for WeekWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start.date(), self.end.date())
    }
}
