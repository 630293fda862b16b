//! Deterministic demo team seeding.
//!
//! Builds one team (a lead plus N reps with capacity profiles) and a
//! spread of work items across a week. Same seed, same data.

use crate::{
    config::EngineConfig,
    error::CapacityResult,
    profile::{parse_weekday_code, CapacityProfile, Role},
    rng::{SeedRng, SeedStream},
    store::CrmStore,
    types::{TeamId, UserId},
    week::WeekWindow,
    work_item::{ItemStatus, KanbanColumn, WorkItem},
};
use chrono::{Duration, NaiveTime};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct DemoTeam {
    pub team_id: TeamId,
    pub lead_id: UserId,
    pub rep_ids: Vec<UserId>,
    pub items_created: usize,
}

pub struct DemoSeeder<'a> {
    store: &'a CrmStore,
    config: &'a EngineConfig,
    seed: u64,
}

impl<'a> DemoSeeder<'a> {
    pub fn new(store: &'a CrmStore, config: &'a EngineConfig, seed: u64) -> Self {
        Self { store, config, seed }
    }

    pub fn seed_team(&self, team_id: &str, reps: usize, window: &WeekWindow) -> CapacityResult<DemoTeam> {
        let mut member_rng = SeedRng::new(self.seed, SeedStream::Members);
        let mut profile_rng = SeedRng::new(self.seed, SeedStream::Profiles);
        let mut item_rng = SeedRng::new(self.seed, SeedStream::Items);

        self.store.insert_team(team_id, &format!("{} Sales", member_rng.pick(REGIONS)))?;

        let lead_id = format!("{team_id}-lead");
        self.store.insert_user(&lead_id, &full_name(&mut member_rng), &Role::TeamLead, true)?;
        self.store.add_team_member(team_id, &lead_id)?;

        let mut rep_ids = Vec::with_capacity(reps);
        for n in 1..=reps {
            let rep_id = format!("{team_id}-rep-{n:02}");
            self.store.insert_user(&rep_id, &full_name(&mut member_rng), &Role::SalesRep, true)?;
            self.store.add_team_member(team_id, &rep_id)?;
            self.store.upsert_capacity_profile(&self.profile_for(&rep_id, &mut profile_rng))?;
            rep_ids.push(rep_id);
        }

        let mut positions: HashMap<(UserId, KanbanColumn), i64> = HashMap::new();
        let mut items_created = 0;
        let owners = std::iter::once(&lead_id).chain(rep_ids.iter());
        for owner in owners {
            let quota = self.config.default_profile.max_items_per_week.clamp(1, MAX_ITEMS_PER_OWNER);
            let count = item_rng.range_inclusive(0, quota.saturating_add(2));
            for _ in 0..count {
                let item = self.random_item(owner, &lead_id, window, &mut item_rng);
                let key = (owner.clone(), item.kanban_status);
                let slot = positions.entry(key).or_insert(0);
                let item = item.at_position(*slot);
                *slot += 1;
                self.store.insert_work_item(&item)?;
                items_created += 1;
            }
        }

        log::info!(
            "week={} demo: seeded team {team_id} with {} reps and {items_created} items",
            window.monday(),
            rep_ids.len()
        );

        Ok(DemoTeam {
            team_id: team_id.to_string(),
            lead_id,
            rep_ids,
            items_created,
        })
    }

    fn profile_for(&self, user_id: &str, rng: &mut SeedRng) -> CapacityProfile {
        let defaults = &self.config.default_profile;
        let quota = defaults.max_items_per_week;
        let max_items_per_week = rng.range_inclusive(quota.saturating_sub(3).max(1), quota.saturating_add(3));

        let mut profile = CapacityProfile::weekdays(user_id, max_items_per_week);
        let days: std::collections::HashSet<_> = defaults
            .working_days
            .iter()
            .filter_map(|d| parse_weekday_code(d))
            .collect();
        if !days.is_empty() {
            profile.working_days = days;
        }
        profile.working_hours = defaults.working_hours;
        profile
    }

    fn random_item(&self, owner: &str, creator: &str, window: &WeekWindow, rng: &mut SeedRng) -> WorkItem {
        let company = rng.pick(COMPANIES);
        let title = format!("{} {company}", rng.pick(ACTIONS));

        // One in ten lands next week and must not count toward this one.
        let day_offset = if rng.chance(0.1) { 7 } else { rng.next_u64_below(7) as i64 };
        let hour = rng.range_inclusive(8, 18);
        let due_at = (window.monday() + Duration::days(day_offset))
            .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN));

        let roll = rng.next_f64();
        let column = if roll < 0.55 {
            KanbanColumn::Todo
        } else if roll < 0.80 {
            KanbanColumn::InProgress
        } else {
            KanbanColumn::Completed
        };

        let mut item = WorkItem::new(title, creator, Some(owner.to_string()), Some(due_at))
            .with_id(rng.uuid().to_string())
            .in_column(column);
        if rng.chance(0.05) {
            item.status = ItemStatus::Cancelled;
        }
        item
    }
}

fn full_name(rng: &mut SeedRng) -> String {
    format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES))
}

/// Upper bound on seeded items per person, whatever the default quota.
const MAX_ITEMS_PER_OWNER: u32 = 40;

const REGIONS: &[&str] = &["North", "South", "East", "West", "Central", "Enterprise"];

const FIRST_NAMES: &[&str] = &[
    "Ava", "Ben", "Chloe", "Diego", "Elena", "Farid", "Grace", "Hiro", "Isla", "Jonas",
    "Kavya", "Liam", "Maya", "Noah", "Olga", "Priya", "Quinn", "Rosa", "Sami", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Alvarez", "Brennan", "Chen", "Dubois", "Eriksen", "Fischer", "Gupta", "Haddad",
    "Ito", "Jensen", "Kowalski", "Larsen", "Moreau", "Nakamura", "Okafor", "Patel",
];

const ACTIONS: &[&str] = &[
    "Call", "Follow up with", "Send proposal to", "Demo for", "Renewal review with", "Qualify",
];

const COMPANIES: &[&str] = &[
    "Acme Corp", "Globex", "Initech", "Umbrella Health", "Stark Logistics", "Wayne Foods",
    "Hooli", "Vandelay Imports", "Soylent Labs", "Tyrell Systems", "Cyberdyne", "Wonka Retail",
];
