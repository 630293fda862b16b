//! Single-user capacity evaluation against the SQLite store.

mod common;

use capacity_core::{
    assignment::DenialReason,
    capacity::CapacityStatus,
    profile::CapacityProfile,
    work_item::{ItemStatus, KanbanColumn},
};
use chrono::NaiveDate;
use common::*;

/// A rep exactly at quota is Full and cannot take another item.
#[test]
fn quota_exactly_met_is_full_and_refuses_assignment() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(5));
    add_open_items(&engine, "rep-a", 5);

    let info = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(info.current_week_items, 5);
    assert_eq!(info.capacity_percentage, 100);
    assert_eq!(info.status, CapacityStatus::Full);
    assert_eq!(info.available_slots, 0);

    let decision = engine.can_assign("rep-a", None).unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenialReason::AtCapacity));
}

/// Items assigned around the selector push a rep past quota into Overloaded.
#[test]
fn items_added_out_of_band_overload_the_user() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(5));
    add_open_items(&engine, "rep-a", 7);

    let info = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(info.current_week_items, 7);
    assert_eq!(info.status, CapacityStatus::Overloaded);
    assert_eq!(info.available_slots, 0);
}

/// No profile yields no capacity info, and assignment is refused as NoProfile.
#[test]
fn user_without_profile_is_absent_not_an_error() {
    let engine = build();
    add_rep(&engine, "rep-a", None);
    add_open_items(&engine, "rep-a", 2);

    assert!(engine.user_capacity("rep-a", None).unwrap().is_none());

    let decision = engine.can_assign("rep-a", None).unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.available_slots, 0);
    assert_eq!(decision.reason, Some(DenialReason::NoProfile));
}

/// A zero quota is treated the same as a missing profile.
#[test]
fn zero_quota_counts_as_unconfigured() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(0));

    assert!(engine.user_capacity("rep-a", None).unwrap().is_none());
    assert_eq!(
        engine.can_assign("rep-a", None).unwrap().reason,
        Some(DenialReason::NoProfile)
    );
}

/// Only open items due Monday 00:00 through Sunday 23:59 count toward the week.
#[test]
fn only_open_items_due_inside_the_week_count() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(10));

    // Inside the week: Monday 00:00 and Sunday late evening.
    add_item(&engine, "mon-start", "rep-a", at(2024, 3, 4, 0, 0), KanbanColumn::Todo);
    add_item(&engine, "sun-late", "rep-a", at(2024, 3, 10, 23, 59), KanbanColumn::InProgress);
    // Outside: previous Sunday, following Monday.
    add_item(&engine, "prev-sun", "rep-a", at(2024, 3, 3, 12, 0), KanbanColumn::Todo);
    add_item(&engine, "next-mon", "rep-a", at(2024, 3, 11, 0, 0), KanbanColumn::Todo);
    // Closed items never count.
    add_item(&engine, "done", "rep-a", at(2024, 3, 6, 9, 0), KanbanColumn::Completed);
    add_item(&engine, "cancelled", "rep-a", at(2024, 3, 6, 9, 0), KanbanColumn::Todo);
    cancel(&engine, "cancelled");

    let info = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(info.current_week_items, 2);
    assert_eq!(info.available_slots, 8);
    assert_eq!(info.status, CapacityStatus::Available);
}

/// Undated and unassigned items never count toward anyone's week.
#[test]
fn items_without_due_date_or_assignee_do_not_count() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(4));

    let undated = capacity_core::work_item::WorkItem::new("undated", CREATOR, Some("rep-a".into()), None)
        .with_id("undated");
    engine.store.insert_work_item(&undated).unwrap();
    let unassigned =
        capacity_core::work_item::WorkItem::new("unassigned", CREATOR, None, Some(at(2024, 3, 6, 9, 0)))
            .with_id("unassigned");
    engine.store.insert_work_item(&unassigned).unwrap();

    let info = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(info.current_week_items, 0);
}

/// Any date inside a week selects that week instead of the clock's.
#[test]
fn explicit_week_overrides_the_clock() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(4));
    add_item(&engine, "next-week", "rep-a", at(2024, 3, 13, 9, 0), KanbanColumn::Todo);

    let this_week = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(this_week.current_week_items, 0);

    // Any day of the following week selects it, including its Sunday.
    let sunday = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
    let next_week = engine.user_capacity("rep-a", Some(sunday)).unwrap().unwrap();
    assert_eq!(next_week.current_week_items, 1);
    assert_eq!(next_week.capacity_percentage, 25);
}

/// Three of four items is 75%, the start of the Moderate band.
#[test]
fn three_of_four_is_moderate() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(4));
    add_open_items(&engine, "rep-a", 3);

    let info = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(info.capacity_percentage, 75);
    assert_eq!(info.status, CapacityStatus::Moderate);
    assert!(engine.can_assign("rep-a", None).unwrap().allowed);
}

/// Moving an item to Completed frees a slot for the same week.
#[test]
fn completing_an_item_frees_a_slot() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(5));
    add_open_items(&engine, "rep-a", 5);
    assert!(!engine.can_assign("rep-a", None).unwrap().allowed);

    let moved = engine
        .move_item("rep-a-item-0", KanbanColumn::Todo, KanbanColumn::Completed, 0)
        .unwrap();
    assert_eq!(moved.kanban_status, KanbanColumn::Completed);
    assert_eq!(moved.status, ItemStatus::Done);

    // Still due this week, but closed.
    let info = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(info.current_week_items, 4);
    let decision = engine.can_assign("rep-a", None).unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.available_slots, 1);
}

/// Completing and then reopening an item restores the original count.
#[test]
fn round_trip_through_the_board_restores_the_count() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(3));
    add_item(&engine, "task", "rep-a", at(2024, 3, 5, 14, 0), KanbanColumn::Todo);
    let count = || engine.user_capacity("rep-a", None).unwrap().unwrap().current_week_items;

    assert_eq!(count(), 1);
    engine.move_item("task", KanbanColumn::Todo, KanbanColumn::InProgress, 0).unwrap();
    assert_eq!(count(), 1);
    engine.move_item("task", KanbanColumn::InProgress, KanbanColumn::Completed, 0).unwrap();
    assert_eq!(count(), 0);
    let back = engine.move_item("task", KanbanColumn::Completed, KanbanColumn::Todo, 0).unwrap();
    assert_eq!(back.status, ItemStatus::NotStarted);
    assert_eq!(count(), 1);
}

/// A raised quota is reflected on the very next query.
#[test]
fn profile_changes_apply_on_the_next_query() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(4));
    add_open_items(&engine, "rep-a", 4);
    assert_eq!(
        engine.user_capacity("rep-a", None).unwrap().unwrap().status,
        CapacityStatus::Full
    );

    engine
        .store
        .upsert_capacity_profile(&CapacityProfile::weekdays("rep-a", 8))
        .unwrap();
    let info = engine.user_capacity("rep-a", None).unwrap().unwrap();
    assert_eq!(info.max_items_per_week, 8);
    assert_eq!(info.capacity_percentage, 50);
    assert_eq!(info.status, CapacityStatus::Available);
}

/// Profiles with no working days are rejected before they reach the table.
#[test]
fn malformed_profiles_are_rejected_on_write() {
    let engine = build();
    add_rep(&engine, "rep-a", None);
    let mut profile = CapacityProfile::weekdays("rep-a", 5);
    profile.working_days.clear();

    assert!(engine.store.upsert_capacity_profile(&profile).is_err());
    assert!(engine.store.get_capacity_profile("rep-a").unwrap().is_none());
}

/// Reassignment moves the item's load to the new owner on the next query.
#[test]
fn reassigning_an_item_moves_its_load() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(4));
    add_rep(&engine, "rep-b", Some(4));
    add_open_items(&engine, "rep-a", 1);
    add_item(&engine, "deal", "rep-a", at(2024, 3, 7, 15, 0), KanbanColumn::InProgress);
    let count = |user: &str| engine.user_capacity(user, None).unwrap().unwrap().current_week_items;
    assert_eq!((count("rep-a"), count("rep-b")), (2, 0));

    engine.store.reassign_item("deal", Some("rep-b")).unwrap();
    assert_eq!((count("rep-a"), count("rep-b")), (1, 1));

    engine.store.reassign_item("deal", None).unwrap();
    assert_eq!((count("rep-a"), count("rep-b")), (1, 0));

    let err = engine.store.reassign_item("ghost", Some("rep-a")).unwrap_err();
    assert!(matches!(err, capacity_core::error::CapacityError::ItemNotFound { .. }));
}

/// Removing a profile turns the user back into "not configured".
#[test]
fn deleted_profile_means_no_profile() {
    let engine = build();
    add_rep(&engine, "rep-a", Some(5));
    add_open_items(&engine, "rep-a", 2);
    assert!(engine.can_assign("rep-a", None).unwrap().allowed);

    engine.store.delete_capacity_profile("rep-a").unwrap();

    assert!(engine.user_capacity("rep-a", None).unwrap().is_none());
    let decision = engine.can_assign("rep-a", None).unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenialReason::NoProfile));
}
