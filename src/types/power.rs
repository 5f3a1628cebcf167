//! HOS accumulator ("power") carried between duty periods

use std::fmt;

use chrono::{Duration, Local, NaiveDateTime};

use crate::error::{ScheduleError, ScheduleResult};
use crate::types::format_duration;

/// A driver's accumulated drive and on-duty time plus the start of the
/// current duty window.
#[derive(Debug, Clone, PartialEq)]
pub struct HosPower {
    accumulated_drive_time: Duration,
    accumulated_on_duty_time: Duration,
    accumulated_weekly_on_duty_time: Duration,
    duty_start: NaiveDateTime,
}

impl HosPower {
    /// Create an accumulator seeded with values carried over from earlier work.
    pub fn new(
        accumulated_drive_time: Duration,
        accumulated_on_duty_time: Duration,
        accumulated_weekly_on_duty_time: Duration,
        duty_start: NaiveDateTime,
    ) -> ScheduleResult<Self> {
        let checks = [
            (accumulated_drive_time, "accumulated drive time"),
            (accumulated_on_duty_time, "accumulated on-duty time"),
            (accumulated_weekly_on_duty_time, "accumulated weekly on-duty time"),
        ];
        for (value, field) in checks {
            if value < Duration::zero() {
                return Err(ScheduleError::NegativeDuration { field });
            }
        }

        Ok(Self {
            accumulated_drive_time,
            accumulated_on_duty_time,
            accumulated_weekly_on_duty_time,
            duty_start,
        })
    }

    /// Accumulator with nothing carried over.
    pub fn fresh(duty_start: NaiveDateTime) -> Self {
        Self {
            accumulated_drive_time: Duration::zero(),
            accumulated_on_duty_time: Duration::zero(),
            accumulated_weekly_on_duty_time: Duration::zero(),
            duty_start,
        }
    }

    pub fn accumulated_drive_time(&self) -> Duration {
        self.accumulated_drive_time
    }

    pub fn accumulated_on_duty_time(&self) -> Duration {
        self.accumulated_on_duty_time
    }

    pub fn accumulated_weekly_on_duty_time(&self) -> Duration {
        self.accumulated_weekly_on_duty_time
    }

    pub fn duty_start(&self) -> NaiveDateTime {
        self.duty_start
    }

    pub fn add_drive_time(&mut self, drive_time: Duration) {
        self.accumulated_drive_time += drive_time;
    }

    /// Adds to both the daily and the weekly on-duty counters.
    pub fn add_on_duty_time(&mut self, on_duty_time: Duration) {
        self.accumulated_on_duty_time += on_duty_time;
        self.accumulated_weekly_on_duty_time += on_duty_time;
    }

    /// 34-hour restart: zero every counter and open a new duty window now.
    pub fn apply_34_hour_restart(&mut self) {
        self.apply_34_hour_restart_at(Local::now().naive_local());
    }

    pub fn apply_34_hour_restart_at(&mut self, now: NaiveDateTime) {
        self.accumulated_drive_time = Duration::zero();
        self.accumulated_on_duty_time = Duration::zero();
        self.accumulated_weekly_on_duty_time = Duration::zero();
        self.duty_start = now;
    }
}

impl fmt::Display for HosPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Power{{accumulatedDriveTime={}, accumulatedOnDutyTime={}, accumulatedWeeklyOnDutyTime={}, dutyStartTime={}}}",
            format_duration(self.accumulated_drive_time),
            format_duration(self.accumulated_on_duty_time),
            format_duration(self.accumulated_weekly_on_duty_time),
            self.duty_start.format("%Y-%m-%dT%H:%M")
        )
    }
}
