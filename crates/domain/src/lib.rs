//! # plughub-domain
//!
//! Pure domain model for the plughub outlet automation system.
//!
//! ## Responsibilities
//! - Foundational types: outlet state, epoch timestamps, error conventions
//! - Define **Devices** (multi-outlet strips) and **Outlets**
//! - Define **Schedules** (none / daily windows / repeating cycles) with
//!   one-shot validation from raw configuration
//! - Conflict detection over concrete time windows, including midnight wrap
//! - Pure desired-state evaluation for daily schedules
//! - Tracker record types for repeating-cycle state
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! It must never import anything from `app` or adapter crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod device;
pub mod error;
pub mod outlet;
pub mod schedule;
pub mod state;
pub mod time;
pub mod tracker;
