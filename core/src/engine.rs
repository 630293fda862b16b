//! The capacity engine, entry point for the UI / API layer.
//!
//! READ PATH (planning):
//!   WeekWindow → CapacityEvaluator → TeamCapacityAggregator → AssignmentSelector
//! WRITE PATH (day-to-day):
//!   BoardStore ↔ WeeklyBoardController
//!
//! RULES:
//!   - Every call is request-scoped; nothing is cached between calls.
//!   - The two paths share no mutable state.
//!   - `week` arguments are any date inside the wanted week; None means
//!     the clock's current week.

use crate::{
    assignment::{AssignmentDecision, AssignmentSelector},
    board::{BoardView, WeeklyBoard, WeeklyBoardController},
    capacity::{CapacityEvaluator, CapacityInfo, Thresholds},
    clock::{Clock, FixedClock},
    config::EngineConfig,
    error::CapacityResult,
    source::{BoardScope, BoardStore, CapacitySource},
    store::CrmStore,
    team_capacity::{TeamCapacity, TeamCapacityAggregator},
    week::WeekWindow,
    work_item::{KanbanColumn, WorkItem},
};
use chrono::NaiveDate;

pub struct CapacityEngine<S> {
    pub store: S,
    config: EngineConfig,
    clock: Box<dyn Clock>,
}

impl<S: CapacitySource + BoardStore> CapacityEngine<S> {
    pub fn new(store: S, config: EngineConfig, clock: Box<dyn Clock>) -> CapacityResult<Self> {
        config.validate()?;
        Ok(Self { store, config, clock })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// The week containing `week`, or the current week.
    pub fn window(&self, week: Option<NaiveDate>) -> WeekWindow {
        WeekWindow::containing(week.unwrap_or_else(|| self.clock.today()))
    }

    fn thresholds(&self) -> Thresholds {
        Thresholds::from(&self.config)
    }

    // ── Capacity (read path) ───────────────────────────────────────

    pub fn user_capacity(&self, user_id: &str, week: Option<NaiveDate>) -> CapacityResult<Option<CapacityInfo>> {
        CapacityEvaluator::new(&self.store, self.thresholds()).evaluate(user_id, &self.window(week))
    }

    pub fn team_capacity(&self, team_id: &str, week: Option<NaiveDate>) -> CapacityResult<TeamCapacity> {
        TeamCapacityAggregator::new(&self.store, self.thresholds(), &self.config.eligible_roles)
            .aggregate(team_id, &self.window(week))
    }

    pub fn can_assign(&self, user_id: &str, week: Option<NaiveDate>) -> CapacityResult<AssignmentDecision> {
        AssignmentSelector::new(&self.store, self.thresholds(), &self.config.eligible_roles)
            .can_assign(user_id, &self.window(week))
    }

    /// Advisory only. No slot is reserved.
    pub fn pick_best_candidate(&self, team_id: &str, week: Option<NaiveDate>) -> CapacityResult<Option<CapacityInfo>> {
        AssignmentSelector::new(&self.store, self.thresholds(), &self.config.eligible_roles)
            .pick_best_candidate(team_id, &self.window(week))
    }

    // ── Board (write path) ─────────────────────────────────────────

    pub fn weekly_board(&self, scope: &BoardScope, week: Option<NaiveDate>) -> CapacityResult<WeeklyBoard> {
        WeeklyBoardController::new(&self.store).weekly_board(scope, &self.window(week))
    }

    pub fn board_view(&self, scope: BoardScope, week: Option<NaiveDate>) -> CapacityResult<BoardView> {
        WeeklyBoardController::new(&self.store).load(scope, self.window(week))
    }

    /// Move without a local view. Returns the updated item.
    pub fn move_item(
        &self,
        item_id: &str,
        from: KanbanColumn,
        to: KanbanColumn,
        position: i64,
    ) -> CapacityResult<WorkItem> {
        WeeklyBoardController::new(&self.store).commit(item_id, from, to, position, self.today())
    }

    /// Move with an optimistic local view that is rebuilt on failure.
    pub fn move_item_in_view(
        &self,
        view: &mut BoardView,
        item_id: &str,
        from: KanbanColumn,
        to: KanbanColumn,
        position: i64,
    ) -> CapacityResult<WorkItem> {
        WeeklyBoardController::new(&self.store).move_item(view, item_id, from, to, position, self.today())
    }
}

impl CapacityEngine<CrmStore> {
    /// Migrated in-memory store, default config, clock pinned to `today`.
    pub fn build_test(today: NaiveDate) -> CapacityResult<Self> {
        let store = CrmStore::in_memory()?;
        store.migrate()?;
        Self::new(store, EngineConfig::default(), Box::new(FixedClock::new(today)))
    }
}
