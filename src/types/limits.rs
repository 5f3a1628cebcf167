//! Hours-of-service caps

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::defaults;

/// The four regulatory caps a schedule is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HosCap {
    /// Continuous driving without a rest break
    DrivingWithoutBreak,
    /// Total driving within the duty period
    DailyDriving,
    /// Wall-clock span from duty start to the end of the last on-duty activity
    DutyWindow,
    /// Rolling weekly on-duty total
    WeeklyOnDuty,
}

impl fmt::Display for HosCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HosCap::DrivingWithoutBreak => "8-hour driving without break",
            HosCap::DailyDriving => "11-hour driving limit",
            HosCap::DutyWindow => "14-hour duty window",
            HosCap::WeeklyOnDuty => "70-hour weekly on-duty limit",
        };
        f.write_str(name)
    }
}

/// Limits table used by a schedule
#[derive(Debug, Clone, PartialEq)]
pub struct HosLimits {
    pub max_driving_without_break: Duration,
    pub break_duration: Duration,
    pub max_driving: Duration,
    pub max_duty_window: Duration,
    pub max_weekly_on_duty: Duration,
}

impl Default for HosLimits {
    fn default() -> Self {
        Self {
            max_driving_without_break: Duration::minutes(defaults::MAX_DRIVING_WITHOUT_BREAK_MINUTES),
            break_duration: defaults::default_break_duration(),
            max_driving: Duration::minutes(defaults::MAX_DRIVING_MINUTES),
            max_duty_window: Duration::minutes(defaults::MAX_DUTY_WINDOW_MINUTES),
            max_weekly_on_duty: Duration::minutes(defaults::MAX_WEEKLY_ON_DUTY_MINUTES),
        }
    }
}

impl HosLimits {
    pub fn limit_for(&self, cap: HosCap) -> Duration {
        match cap {
            HosCap::DrivingWithoutBreak => self.max_driving_without_break,
            HosCap::DailyDriving => self.max_driving,
            HosCap::DutyWindow => self.max_duty_window,
            HosCap::WeeklyOnDuty => self.max_weekly_on_duty,
        }
    }
}
