//! HOS scheduler - a single driver's duty schedule checked against
//! hours-of-service caps, with automatic rest-break insertion.

pub mod config;
pub mod defaults;
pub mod error;
pub mod services;
pub mod types;

pub use error::{ErrorKind, ScheduleError, ScheduleResult, Violation};
pub use services::{DrivingSchedule, InsertOutcome};
pub use types::{Coordinates, HosCap, HosLimits, HosPower, TimedLocation};
