//! Weekly Kanban board.
//!
//! The Todo, InProgress and Completed columns are mirrored 1:1 onto
//! NotStarted / InProgress / Done. Cancelled items are on no column.
//! Every column-to-column move is legal, including backward moves and
//! same-column reorders.
//!
//! Move protocol:
//!   1. Apply the move to the caller's `BoardView` immediately.
//!   2. Check the item really sits in `from` in the store.
//!   3. Write column + status + position as one update.
//!   4. On any failure, rebuild the whole view from the store and return
//!      the error. No partial rollback of the local reorder is attempted.

use crate::{
    error::{CapacityError, CapacityResult},
    event::BoardEvent,
    source::{BoardScope, BoardStore},
    week::WeekWindow,
    work_item::{KanbanColumn, WorkItem},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Open and completed items of one week, split by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBoard {
    pub todo: Vec<WorkItem>,
    pub in_progress: Vec<WorkItem>,
    pub completed: Vec<WorkItem>,
}

impl WeeklyBoard {
    /// Split items by column, keeping their incoming order.
    pub fn partition(items: impl IntoIterator<Item = WorkItem>) -> Self {
        let mut board = Self::default();
        for item in items {
            if let Some(column) = item.board_column() {
                board.column_mut(column).push(item);
            }
        }
        board
    }

    pub fn column(&self, column: KanbanColumn) -> &[WorkItem] {
        match column {
            KanbanColumn::Todo       => &self.todo,
            KanbanColumn::InProgress => &self.in_progress,
            KanbanColumn::Completed  => &self.completed,
        }
    }

    pub fn column_mut(&mut self, column: KanbanColumn) -> &mut Vec<WorkItem> {
        match column {
            KanbanColumn::Todo       => &mut self.todo,
            KanbanColumn::InProgress => &mut self.in_progress,
            KanbanColumn::Completed  => &mut self.completed,
        }
    }

    /// Column and index of an item.
    pub fn locate(&self, item_id: &str) -> Option<(KanbanColumn, usize)> {
        KanbanColumn::ALL.into_iter().find_map(|column| {
            self.column(column)
                .iter()
                .position(|i| i.item_id == item_id)
                .map(|idx| (column, idx))
        })
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in a column, in display order.
    pub fn ids(&self, column: KanbanColumn) -> Vec<&str> {
        self.column(column).iter().map(|i| i.item_id.as_str()).collect()
    }
}

/// The caller's local copy of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub scope: BoardScope,
    pub window: WeekWindow,
    pub board: WeeklyBoard,
    /// Set when a failed move could not be followed by a re-fetch.
    /// The view must be reloaded before it is trusted again.
    pub needs_refresh: bool,
}

impl BoardView {
    /// Optimistically move an item inside the local copy.
    /// Returns false (and changes nothing) if the item is not in `from`.
    pub fn apply_move(&mut self, item_id: &str, from: KanbanColumn, to: KanbanColumn, position: i64) -> bool {
        let Some(idx) = self.board.column(from).iter().position(|i| i.item_id == item_id) else {
            return false;
        };
        let mut item = self.board.column_mut(from).remove(idx);
        item.kanban_status = to;
        item.status = to.status();

        // The store numbers each assignee's items in a column 0..n.
        let assignee = item.assignee_id.clone();
        let target = self.board.column_mut(to);
        let index = position.clamp(0, target.len() as i64) as usize;
        target.insert(index, item);
        for (pos, sibling) in target
            .iter_mut()
            .filter(|i| i.assignee_id == assignee)
            .enumerate()
        {
            sibling.position = pos as i64;
        }
        true
    }

    /// Replace the local copy of an item with the store's version.
    fn confirm(&mut self, item: &WorkItem) {
        if let Some((column, idx)) = self.board.locate(&item.item_id) {
            self.board.column_mut(column)[idx] = item.clone();
        }
    }
}

pub struct WeeklyBoardController<'a, S: BoardStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: BoardStore + ?Sized> WeeklyBoardController<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn weekly_board(&self, scope: &BoardScope, window: &WeekWindow) -> CapacityResult<WeeklyBoard> {
        let items = self.store.list_board_items(scope, window)?;
        Ok(WeeklyBoard::partition(items))
    }

    pub fn load(&self, scope: BoardScope, window: WeekWindow) -> CapacityResult<BoardView> {
        let board = self.weekly_board(&scope, &window)?;
        Ok(BoardView {
            scope,
            window,
            board,
            needs_refresh: false,
        })
    }

    /// Move an item and return the store's updated copy.
    ///
    /// `view` is updated optimistically before the write and rebuilt from
    /// the store if anything fails. A `ColumnConflict` means the caller's
    /// board was stale; the rebuilt view is current and the move can be
    /// retried against it.
    pub fn move_item(
        &self,
        view: &mut BoardView,
        item_id: &str,
        from: KanbanColumn,
        to: KanbanColumn,
        position: i64,
        moved_on: NaiveDate,
    ) -> CapacityResult<WorkItem> {
        let applied = view.apply_move(item_id, from, to, position);
        let user_scope = matches!(view.scope, BoardScope::User(_));

        match self.commit(item_id, from, to, position, moved_on) {
            Ok(item) => {
                match (user_scope, applied) {
                    (true, true) => view.confirm(&item),
                    // Team columns interleave assignees, and a view that never
                    // held the item is stale anyway: take the store's order.
                    _ => self.refresh(view, item_id),
                }
                Ok(item)
            }
            Err(err) => {
                log::warn!("week={} item={item_id}: move failed, reloading board: {err}", view.window.monday());
                self.reconcile(view, item_id, &err);
                Err(err)
            }
        }
    }

    /// The move as a single command with no local view: verify `from`,
    /// write, audit. Returns the store's updated item.
    pub fn commit(
        &self,
        item_id: &str,
        from: KanbanColumn,
        to: KanbanColumn,
        position: i64,
        moved_on: NaiveDate,
    ) -> CapacityResult<WorkItem> {
        let item = self.commit_move(item_id, from, to, position)?;
        log::info!(
            "item={item_id}: moved {} -> {} at {}",
            from.as_str(),
            to.as_str(),
            item.position
        );
        let event = BoardEvent::ItemMoved {
            item_id: item_id.to_string(),
            from,
            to,
            position: item.position,
            moved_on,
        };
        if let Err(e) = self.store.record_board_event(&event) {
            log::warn!("item={item_id}: move committed but audit write failed: {e}");
        }
        Ok(item)
    }

    fn commit_move(&self, item_id: &str, from: KanbanColumn, to: KanbanColumn, position: i64) -> CapacityResult<WorkItem> {
        let current = self
            .store
            .get_item(item_id)?
            .ok_or_else(|| CapacityError::ItemNotFound { item_id: item_id.to_string() })?;

        let Some(actual) = current.board_column() else {
            return Err(CapacityError::NotOnBoard { item_id: item_id.to_string() });
        };
        if actual != from {
            return Err(CapacityError::ColumnConflict {
                item_id: item_id.to_string(),
                expected: from,
                actual,
            });
        }

        self.store.update_item_status(item_id, to, to.status(), position)
    }

    fn refresh(&self, view: &mut BoardView, item_id: &str) {
        match self.weekly_board(&view.scope, &view.window) {
            Ok(board) => {
                view.board = board;
                view.needs_refresh = false;
            }
            Err(e) => {
                log::warn!("item={item_id}: board reload failed, view marked stale: {e}");
                view.needs_refresh = true;
            }
        }
    }

    /// Throw away the optimistic state and re-read the whole board.
    fn reconcile(&self, view: &mut BoardView, item_id: &str, cause: &CapacityError) {
        self.refresh(view, item_id);
        let event = BoardEvent::MoveReconciled {
            item_id: item_id.to_string(),
            reason: cause.to_string(),
        };
        if let Err(e) = self.store.record_board_event(&event) {
            log::debug!("item={item_id}: reconcile audit write failed: {e}");
        }
    }
}
