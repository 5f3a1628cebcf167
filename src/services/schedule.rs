//! Driver duty schedule with HOS validation.
//!
//! Inserting a task validates it against the caps, places a rest break in
//! front of it when continuous driving would reach the threshold, and then
//! walks the rest of the schedule re-deriving start times from the previous
//! entry's end plus the estimated drive between stops. The walk re-checks
//! every task and adds breaks where the shift pushed continuous driving over.
//!
//! All of this happens on a working copy of the entries. The schedule and its
//! accumulator only change when the whole insertion succeeds.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{ScheduleError, ScheduleResult, Violation};
use crate::services::accounting::{self, CarriedHours};
use crate::services::geo;
use crate::types::{HosCap, HosLimits, HosPower, TimedLocation};

/// What a successful insertion did to the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertOutcome {
    /// Final position of the inserted task
    pub index: usize,
    /// Breaks added in front of the task or further down the schedule
    pub breaks_inserted: usize,
    /// Entries whose times moved during re-timing
    pub entries_shifted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CascadeReport {
    shifted: usize,
    breaks_inserted: usize,
}

/// A single driver's schedule for one duty period
#[derive(Debug, Clone)]
pub struct DrivingSchedule {
    entries: Vec<TimedLocation>,
    power: HosPower,
    carried: CarriedHours,
    limits: HosLimits,
}

impl DrivingSchedule {
    pub fn new(power: HosPower) -> Self {
        Self::with_limits(power, HosLimits::default())
    }

    pub fn with_limits(power: HosPower, limits: HosLimits) -> Self {
        let carried = CarriedHours::from(&power);
        Self {
            entries: Vec::new(),
            power,
            carried,
            limits,
        }
    }

    /// Snapshot of the entries (not a live view)
    pub fn entries(&self) -> Vec<TimedLocation> {
        self.entries.clone()
    }

    pub fn power(&self) -> &HosPower {
        &self.power
    }

    pub fn limits(&self) -> &HosLimits {
        &self.limits
    }

    /// Hand the accumulator over, e.g. to open the next duty period.
    pub fn into_power(self) -> HosPower {
        self.power
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Driving through entry `index` (inclusive), carried time included
    pub fn cumulative_driving(&self, index: usize) -> Duration {
        accounting::cumulative_driving(&self.entries, &self.carried, index + 1)
    }

    pub fn cumulative_on_duty(&self, index: usize) -> Duration {
        accounting::cumulative_on_duty(&self.entries, &self.carried, index + 1)
    }

    pub fn cumulative_weekly_on_duty(&self, index: usize) -> Duration {
        accounting::cumulative_weekly_on_duty(&self.entries, &self.carried, index + 1)
    }

    /// Append a task at the end of the schedule.
    pub fn add_task(&mut self, task: TimedLocation) -> ScheduleResult<InsertOutcome> {
        self.insert_task(self.entries.len(), task)
    }

    /// Insert a task at `index`, adding breaks and re-timing everything after it.
    ///
    /// On error nothing changes, neither the entries nor the accumulator.
    pub fn insert_task(&mut self, index: usize, task: TimedLocation) -> ScheduleResult<InsertOutcome> {
        if index > self.entries.len() {
            return Err(ScheduleError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        if task.is_break() {
            return Err(ScheduleError::BreakNotAllowed);
        }

        let drive_time = task.driving_duration();
        let on_duty_time = task.total_on_duty_duration();

        let mut work = self.working_copy();
        let outcome = match work.insert(index, task) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Rejected task at index {}: {}", index, e);
                return Err(e);
            }
        };

        let entries = work.entries;
        self.entries = entries;
        self.power.add_drive_time(drive_time);
        self.power.add_on_duty_time(on_duty_time);

        info!(
            "Inserted task at index {} ({} breaks added, {} entries shifted, {} entries total)",
            outcome.index,
            outcome.breaks_inserted,
            outcome.entries_shifted,
            self.entries.len()
        );
        Ok(outcome)
    }

    fn working_copy(&self) -> WorkingCopy<'_> {
        WorkingCopy {
            entries: self.entries.clone(),
            carried: &self.carried,
            limits: &self.limits,
            duty_start: self.power.duty_start(),
        }
    }
}

impl fmt::Display for DrivingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "No tasks in the schedule.");
        }
        writeln!(f, "Driver HOS: {}", self.power)?;
        writeln!(f, "Driving Schedule:")?;
        for (i, entry) in self.entries.iter().enumerate() {
            let label = if entry.is_break() { "Break" } else { "Task" };
            writeln!(f, "{} {}: {}", label, i + 1, entry)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Working copy
// ---------------------------------------------------------------------------

/// Entries being edited, plus the read-only context needed to check them
struct WorkingCopy<'a> {
    entries: Vec<TimedLocation>,
    carried: &'a CarriedHours,
    limits: &'a HosLimits,
    duty_start: NaiveDateTime,
}

impl WorkingCopy<'_> {
    fn insert(&mut self, index: usize, task: TimedLocation) -> ScheduleResult<InsertOutcome> {
        self.validate_candidate(index, &task)?;

        self.entries.insert(index, task);

        let mut position = index;
        let mut breaks_inserted = 0;
        if self.needs_break_before(position) {
            self.insert_break_before(position);
            position += 1;
            breaks_inserted += 1;
        }

        let report = self.cascade(position)?;

        Ok(InsertOutcome {
            index: position,
            breaks_inserted: breaks_inserted + report.breaks_inserted,
            entries_shifted: report.shifted,
        })
    }

    /// Checks that need nothing but the current entries and the candidate.
    fn validate_candidate(&self, index: usize, task: &TimedLocation) -> ScheduleResult<()> {
        let drive_time = task.driving_duration();
        self.check(index, HosCap::DrivingWithoutBreak, drive_time, |actual, limit| actual >= limit)?;

        let driving = accounting::cumulative_driving(&self.entries, self.carried, index) + drive_time;
        self.check(index, HosCap::DailyDriving, driving, |actual, limit| actual > limit)?;

        let weekly = accounting::cumulative_weekly_on_duty(&self.entries, self.carried, index)
            + task.total_on_duty_duration();
        self.check(index, HosCap::WeeklyOnDuty, weekly, |actual, limit| actual > limit)?;

        let duty_end = match index.checked_sub(1).map(|i| &self.entries[i]) {
            Some(prev) => {
                prev.end()
                    + geo::drive_time(&prev.location(), &task.location())
                    + drive_time
                    + task.on_duty_non_driving()
            }
            None => task.end() + task.on_duty_non_driving(),
        };
        self.check_duty_window(index, duty_end)
    }

    fn check(
        &self,
        index: usize,
        cap: HosCap,
        actual: Duration,
        breached: impl Fn(Duration, Duration) -> bool,
    ) -> ScheduleResult<()> {
        let limit = self.limits.limit_for(cap);
        if breached(actual, limit) {
            return Err(ScheduleError::PolicyViolation(Violation {
                index,
                cap,
                actual,
                limit,
            }));
        }
        Ok(())
    }

    fn check_duty_window(&self, index: usize, duty_end: NaiveDateTime) -> ScheduleResult<()> {
        self.check(index, HosCap::DutyWindow, duty_end - self.duty_start, |actual, limit| actual > limit)
    }

    fn needs_break_before(&self, index: usize) -> bool {
        accounting::needs_break_before(
            &self.entries,
            self.carried,
            index,
            self.limits.max_driving_without_break,
        )
    }

    /// Put a break in front of the entry at `index`, anchored at the previous
    /// entry's end and location, or at the entry's own start for index 0.
    fn insert_break_before(&mut self, index: usize) {
        let anchor = match index.checked_sub(1) {
            Some(prev) => &self.entries[prev],
            None => &self.entries[index],
        };
        let start = if index > 0 { anchor.end() } else { anchor.start() };
        let rest = TimedLocation::rest_break(start, anchor.location(), self.limits.break_duration);

        debug!(
            "Inserting {} min break at index {} starting {}",
            self.limits.break_duration.num_minutes(),
            index,
            start
        );
        self.entries.insert(index, rest);
    }

    /// Re-time and re-check every entry from `start` to the end.
    fn cascade(&mut self, start: usize) -> ScheduleResult<CascadeReport> {
        let mut report = CascadeReport::default();
        let mut i = start;

        while i < self.entries.len() {
            if i == 0 {
                let first = &self.entries[0];
                self.check_duty_window(0, first.end() + first.on_duty_non_driving())?;
            } else {
                let prev = &self.entries[i - 1];
                let current = &self.entries[i];

                let drive_time = if current.is_break() {
                    Duration::zero()
                } else {
                    geo::drive_time(&prev.location(), &current.location())
                };
                let expected_start = prev.end() + drive_time;

                if !current.is_break() {
                    let driving = accounting::cumulative_driving(&self.entries, self.carried, i + 1);
                    self.check(i, HosCap::DailyDriving, driving, |actual, limit| actual > limit)?;

                    let weekly = accounting::cumulative_weekly_on_duty(&self.entries, self.carried, i + 1);
                    self.check(i, HosCap::WeeklyOnDuty, weekly, |actual, limit| actual > limit)?;

                    self.check_duty_window(i, expected_start + current.total_on_duty_duration())?;
                }

                let delta = expected_start - current.start();
                if delta != Duration::zero() {
                    debug!("Shifting entry {} by {} min", i, delta.num_minutes());
                    self.entries[i].shift_by(delta);
                    report.shifted += 1;
                }
            }

            if !self.entries[i].is_break() && self.needs_break_before(i + 1) {
                self.insert_break_before(i + 1);
                report.breaks_inserted += 1;
            }
            i += 1;
        }

        Ok(report)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
