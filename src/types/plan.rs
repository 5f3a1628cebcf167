//! Plan and report types for the plan runner (JSON in, JSON out)

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{Coordinates, HosCap, HosPower, TimedLocation};

/// Largest minute count a plan may carry; keeps later sums and timestamp
/// arithmetic far from chrono's bounds.
const MAX_PLAN_MINUTES: u64 = i32::MAX as u64;

fn minutes(field: &'static str, value: i64) -> ScheduleResult<Duration> {
    if value.unsigned_abs() > MAX_PLAN_MINUTES {
        return Err(ScheduleError::DurationOutOfRange { field, minutes: value });
    }
    Duration::try_minutes(value).ok_or(ScheduleError::DurationOutOfRange { field, minutes: value })
}

/// Carried-over accumulator values, in minutes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSpec {
    #[serde(default)]
    pub drive_minutes: i64,
    #[serde(default)]
    pub on_duty_minutes: i64,
    #[serde(default)]
    pub weekly_on_duty_minutes: i64,
    pub duty_start: NaiveDateTime,
}

impl PowerSpec {
    pub fn to_power(&self) -> ScheduleResult<HosPower> {
        HosPower::new(
            minutes("accumulated drive time", self.drive_minutes)?,
            minutes("accumulated on-duty time", self.on_duty_minutes)?,
            minutes("accumulated weekly on-duty time", self.weekly_on_duty_minutes)?,
            self.duty_start,
        )
    }
}

/// A driving task as requested by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub lat: f64,
    pub lng: f64,
    /// Loading/unloading time at the stop
    #[serde(default)]
    pub on_duty_minutes: i64,
}

impl TaskSpec {
    pub fn to_task(&self) -> ScheduleResult<TimedLocation> {
        TimedLocation::task(
            self.start,
            self.end,
            Coordinates::new(self.lat, self.lng),
            minutes("on-duty non-driving time", self.on_duty_minutes)?,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PlanStep {
    /// Append a task at the end of the schedule
    Add { task: TaskSpec },
    /// Insert a task at a position in the schedule
    Insert { index: usize, task: TaskSpec },
    /// Close the current duty period and restart the accumulator
    Restart { at: NaiveDateTime },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub power: PowerSpec,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Task,
    Break,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub kind: EntryKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub lat: f64,
    pub lng: f64,
    pub driving_minutes: i64,
    pub on_duty_minutes: i64,
}

impl From<&TimedLocation> for EntrySnapshot {
    fn from(entry: &TimedLocation) -> Self {
        Self {
            kind: if entry.is_break() { EntryKind::Break } else { EntryKind::Task },
            start: entry.start(),
            end: entry.end(),
            lat: entry.location().lat,
            lng: entry.location().lng,
            driving_minutes: entry.driving_duration().num_minutes(),
            on_duty_minutes: entry.total_on_duty_duration().num_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSnapshot {
    pub drive_minutes: i64,
    pub on_duty_minutes: i64,
    pub weekly_on_duty_minutes: i64,
    pub duty_start: NaiveDateTime,
}

impl From<&HosPower> for PowerSnapshot {
    fn from(power: &HosPower) -> Self {
        Self {
            drive_minutes: power.accumulated_drive_time().num_minutes(),
            on_duty_minutes: power.accumulated_on_duty_time().num_minutes(),
            weekly_on_duty_minutes: power.accumulated_weekly_on_duty_time().num_minutes(),
            duty_start: power.duty_start(),
        }
    }
}

/// A plan step the schedule refused
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// Position of the step in the plan
    pub step: usize,
    /// Breached cap, when the refusal was a policy violation
    pub cap: Option<HosCap>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub entries: Vec<EntrySnapshot>,
    pub power: PowerSnapshot,
    pub rejections: Vec<Rejection>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub periods: Vec<PeriodReport>,
}

impl PlanReport {
    pub fn rejection_count(&self) -> usize {
        self.periods.iter().map(|p| p.rejections.len()).sum()
    }
}
