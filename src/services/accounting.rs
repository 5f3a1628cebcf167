//! Cumulative HOS accounting over a sequence of entries
//!
//! Totals are always rescanned from the start of the sequence so they stay
//! correct after any re-timing pass. Break entries contribute nothing.

use chrono::Duration;

use crate::types::{HosPower, TimedLocation};

/// Accumulator values at the moment a schedule was bound to its power.
///
/// Accounting seeds from these rather than from the live accumulator, which
/// already includes every task committed to the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarriedHours {
    pub drive_time: Duration,
    pub on_duty_time: Duration,
    pub weekly_on_duty_time: Duration,
}

impl From<&HosPower> for CarriedHours {
    fn from(power: &HosPower) -> Self {
        Self {
            drive_time: power.accumulated_drive_time(),
            on_duty_time: power.accumulated_on_duty_time(),
            weekly_on_duty_time: power.accumulated_weekly_on_duty_time(),
        }
    }
}

fn sum_tasks(entries: &[TimedLocation], count: usize, f: impl Fn(&TimedLocation) -> Duration) -> Duration {
    entries
        .iter()
        .take(count)
        .filter(|e| !e.is_break())
        .fold(Duration::zero(), |acc, e| acc + f(e))
}

/// Carried drive time plus driving of the first `count` entries
pub fn cumulative_driving(entries: &[TimedLocation], carried: &CarriedHours, count: usize) -> Duration {
    carried.drive_time + sum_tasks(entries, count, TimedLocation::driving_duration)
}

/// Carried on-duty time plus on-duty time of the first `count` entries
pub fn cumulative_on_duty(entries: &[TimedLocation], carried: &CarriedHours, count: usize) -> Duration {
    carried.on_duty_time + sum_tasks(entries, count, TimedLocation::total_on_duty_duration)
}

/// Carried weekly on-duty time plus on-duty time of the first `count` entries
pub fn cumulative_weekly_on_duty(entries: &[TimedLocation], carried: &CarriedHours, count: usize) -> Duration {
    carried.weekly_on_duty_time + sum_tasks(entries, count, TimedLocation::total_on_duty_duration)
}

/// Driving since the last break before `index`, including the entry at
/// `index` itself. Without an earlier break the carried drive time counts.
pub fn continuous_driving_through(entries: &[TimedLocation], carried: &CarriedHours, index: usize) -> Duration {
    let mut driving = entries
        .get(index)
        .map(TimedLocation::driving_duration)
        .unwrap_or_else(Duration::zero);

    let end = index.min(entries.len());
    for entry in entries[..end].iter().rev() {
        if entry.is_break() {
            return driving;
        }
        driving += entry.driving_duration();
    }

    driving + carried.drive_time
}

/// Whether a break has to be placed in front of the entry at `index`.
///
/// Never true in front of a break, directly after a break, or past the end.
pub fn needs_break_before(
    entries: &[TimedLocation],
    carried: &CarriedHours,
    index: usize,
    threshold: Duration,
) -> bool {
    let Some(entry) = entries.get(index) else {
        return false;
    };
    if entry.is_break() {
        return false;
    }
    if index > 0 && entries[index - 1].is_break() {
        return false;
    }
    continuous_driving_through(entries, carried, index) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn depot() -> Coordinates {
        Coordinates::new(50.0, 14.0)
    }

    fn task(start_h: u32, end_h: u32, on_duty_min: i64) -> TimedLocation {
        TimedLocation::task(at(start_h, 0), at(end_h, 0), depot(), Duration::minutes(on_duty_min)).unwrap()
    }

    fn carried(drive_h: i64, on_duty_h: i64, weekly_h: i64) -> CarriedHours {
        CarriedHours {
            drive_time: Duration::hours(drive_h),
            on_duty_time: Duration::hours(on_duty_h),
            weekly_on_duty_time: Duration::hours(weekly_h),
        }
    }

    #[test]
    fn test_cumulative_totals_skip_breaks() {
        let entries = vec![
            task(6, 8, 30),
            TimedLocation::rest_break(at(8, 0), depot(), Duration::minutes(30)),
            task(9, 10, 0),
        ];
        let c = carried(1, 2, 40);

        assert_eq!(cumulative_driving(&entries, &c, 3), Duration::hours(4));
        assert_eq!(cumulative_on_duty(&entries, &c, 3), Duration::minutes(5 * 60 + 30));
        assert_eq!(cumulative_weekly_on_duty(&entries, &c, 3), Duration::minutes(43 * 60 + 30));
        // Only the first entry
        assert_eq!(cumulative_driving(&entries, &c, 1), Duration::hours(3));
        // Empty prefix is the carried value
        assert_eq!(cumulative_driving(&entries, &c, 0), Duration::hours(1));
    }

    #[test]
    fn test_continuous_driving_stops_at_last_break() {
        let entries = vec![
            task(6, 9, 0),
            TimedLocation::rest_break(at(9, 0), depot(), Duration::minutes(30)),
            task(10, 12, 0),
            task(12, 13, 0),
        ];
        let c = carried(5, 5, 5);

        assert_eq!(continuous_driving_through(&entries, &c, 3), Duration::hours(3));
        // Before the break the carried drive time counts
        assert_eq!(continuous_driving_through(&entries, &c, 0), Duration::hours(8));
    }

    #[test]
    fn test_index_zero_uses_carried_drive_time() {
        let entries = vec![task(6, 7, 0)];

        assert!(needs_break_before(&entries, &carried(7, 7, 7), 0, Duration::hours(8)));
        assert!(!needs_break_before(&entries, &carried(6, 6, 6), 0, Duration::hours(8)));
    }

    #[test]
    fn test_no_break_after_or_before_a_break() {
        let entries = vec![
            task(6, 10, 0),
            TimedLocation::rest_break(at(10, 0), depot(), Duration::minutes(30)),
            task(11, 15, 0),
        ];
        let c = carried(6, 6, 6);

        assert!(!needs_break_before(&entries, &c, 1, Duration::hours(8)));
        assert!(!needs_break_before(&entries, &c, 2, Duration::hours(8)));
        assert!(!needs_break_before(&entries, &c, 3, Duration::hours(8)));
    }
}
