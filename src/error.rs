//! Error types for schedule construction and mutation

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::types::{format_duration, HosCap};

/// Broad classification of a [`ScheduleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any mutation because the request itself is malformed
    InvalidInput,
    /// The request is well-formed but would break an hours-of-service cap
    PolicyViolation,
}

/// A breached regulatory cap with the computed value that breached it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Position in the sequence of the entry that breached the cap
    pub index: usize,
    pub cap: HosCap,
    pub actual: Duration,
    pub limit: Duration,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entry {} exceeds {}: {} (limit {})",
            self.index,
            self.cap,
            format_duration(self.actual),
            format_duration(self.limit)
        )
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("index {index} out of range for schedule of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("breaks are inserted automatically and cannot be added as tasks")]
    BreakNotAllowed,

    #[error("task ends before it starts ({start} > {end})")]
    InvalidTimeSpan {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("{field} must not be negative")]
    NegativeDuration { field: &'static str },

    #[error("{field} of {minutes} minutes is out of range")]
    DurationOutOfRange { field: &'static str, minutes: i64 },

    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("policy violation: {0}")]
    PolicyViolation(Violation),
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::PolicyViolation(_) => ErrorKind::PolicyViolation,
            _ => ErrorKind::InvalidInput,
        }
    }

    /// The breached cap, if this is a policy violation
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ScheduleError::PolicyViolation(v) => Some(v),
            _ => None,
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
