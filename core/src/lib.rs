//! Team capacity and weekly task board engine for the sales CRM.
//!
//! Tracks how many open work items each rep holds in a calendar week,
//! classifies their load, rolls it up per team, suggests an assignee,
//! and drives the weekly Kanban board.

pub mod assignment;
pub mod board;
pub mod capacity;
pub mod clock;
pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod event;
pub mod profile;
pub mod rng;
pub mod source;
pub mod store;
pub mod team_capacity;
pub mod types;
pub mod week;
pub mod work_item;
