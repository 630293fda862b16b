//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use capacity_core::{
    engine::CapacityEngine,
    profile::{CapacityProfile, Role},
    store::CrmStore,
    work_item::{ItemStatus, KanbanColumn, WorkItem},
};
use chrono::{NaiveDate, NaiveDateTime};

pub const CREATOR: &str = "admin-1";

/// Wednesday 2024-03-06. Its week runs Mon 03-04 .. Sun 03-10.
pub fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// An in-memory engine pinned to `wednesday()` with one admin user.
pub fn build() -> CapacityEngine<CrmStore> {
    let _ = env_logger::builder().is_test(true).try_init();
    let engine = CapacityEngine::build_test(wednesday()).expect("build_test failed");
    engine
        .store
        .insert_user(CREATOR, "Admin", &Role::Admin, true)
        .unwrap();
    engine
}

pub fn add_rep(engine: &CapacityEngine<CrmStore>, user_id: &str, quota: Option<u32>) {
    engine
        .store
        .insert_user(user_id, user_id, &Role::SalesRep, true)
        .unwrap();
    if let Some(quota) = quota {
        engine
            .store
            .upsert_capacity_profile(&CapacityProfile::weekdays(user_id, quota))
            .unwrap();
    }
}

pub fn add_item(
    engine: &CapacityEngine<CrmStore>,
    item_id: &str,
    assignee: &str,
    due_at: NaiveDateTime,
    column: KanbanColumn,
) -> WorkItem {
    let position = engine
        .store
        .board_items_for_user(assignee, &engine.window(Some(due_at.date())))
        .unwrap()
        .iter()
        .filter(|i| i.kanban_status == column)
        .count() as i64;
    let item = WorkItem::new(item_id, CREATOR, Some(assignee.to_string()), Some(due_at))
        .with_id(item_id)
        .in_column(column)
        .at_position(position);
    engine.store.insert_work_item(&item).unwrap();
    item
}

/// `n` open Todo items due on Wednesday.
pub fn add_open_items(engine: &CapacityEngine<CrmStore>, assignee: &str, n: usize) {
    for i in 0..n {
        add_item(
            engine,
            &format!("{assignee}-item-{i}"),
            assignee,
            at(2024, 3, 6, 10, 0),
            KanbanColumn::Todo,
        );
    }
}

pub fn cancel(engine: &CapacityEngine<CrmStore>, item_id: &str) {
    engine
        .store
        .set_item_status(item_id, ItemStatus::Cancelled)
        .unwrap();
}
