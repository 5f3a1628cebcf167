//! Regulatory defaults (US property-carrying HOS rules)

use chrono::Duration;

pub const MAX_DRIVING_WITHOUT_BREAK_MINUTES: i64 = 8 * 60;
pub const BREAK_DURATION_MINUTES: i64 = 30;
pub const MAX_DRIVING_MINUTES: i64 = 11 * 60;
pub const MAX_DUTY_WINDOW_MINUTES: i64 = 14 * 60;
pub const MAX_WEEKLY_ON_DUTY_MINUTES: i64 = 70 * 60;

pub fn default_break_duration() -> Duration {
    Duration::minutes(BREAK_DURATION_MINUTES)
}

pub const DEFAULT_LOG_FILTER: &str = "info,hos_scheduler=debug";
