//! Business logic services

pub mod accounting;
pub mod geo;
pub mod plan_runner;
pub mod schedule;

pub use schedule::{DrivingSchedule, InsertOutcome};
