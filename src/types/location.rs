//! Timed location entries (tasks and rest breaks)

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite, latitude within ±90 and longitude within ±180
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A single task or rest break: a time span at a geographic point.
///
/// Tasks are built by callers through [`TimedLocation::task`]; breaks only
/// come from the schedule itself. Once created, an entry can only be moved
/// in time as a whole, so its own duration never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLocation {
    start: NaiveDateTime,
    end: NaiveDateTime,
    location: Coordinates,
    is_break: bool,
    /// Loading, unloading and other on-duty work that is not driving
    on_duty_non_driving: Duration,
}

impl TimedLocation {
    /// Create a driving task.
    pub fn task(
        start: NaiveDateTime,
        end: NaiveDateTime,
        location: Coordinates,
        on_duty_non_driving: Duration,
    ) -> ScheduleResult<Self> {
        if end < start {
            return Err(ScheduleError::InvalidTimeSpan { start, end });
        }
        if !location.is_valid() {
            return Err(ScheduleError::InvalidCoordinates {
                lat: location.lat,
                lng: location.lng,
            });
        }
        if on_duty_non_driving < Duration::zero() {
            return Err(ScheduleError::NegativeDuration {
                field: "on-duty non-driving time",
            });
        }
        Ok(Self {
            start,
            end,
            location,
            is_break: false,
            on_duty_non_driving,
        })
    }

    pub(crate) fn rest_break(start: NaiveDateTime, location: Coordinates, length: Duration) -> Self {
        Self {
            start,
            end: start + length,
            location,
            is_break: true,
            on_duty_non_driving: Duration::zero(),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn location(&self) -> Coordinates {
        self.location
    }

    pub fn is_break(&self) -> bool {
        self.is_break
    }

    pub fn on_duty_non_driving(&self) -> Duration {
        self.on_duty_non_driving
    }

    /// Time spent behind the wheel; zero for breaks.
    pub fn driving_duration(&self) -> Duration {
        if self.is_break {
            Duration::zero()
        } else {
            self.end - self.start
        }
    }

    pub fn total_on_duty_duration(&self) -> Duration {
        self.driving_duration() + self.on_duty_non_driving
    }

    /// Move both ends of the span by `delta`.
    pub(crate) fn shift_by(&mut self, delta: Duration) {
        self.start += delta;
        self.end += delta;
    }
}

impl fmt::Display for TimedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{{startTime={}, endTime={}, latitude={}, longitude={}, onDutyNonDrivingTime={}m}}",
            if self.is_break { "Break" } else { "Task" },
            self.start.format("%Y-%m-%dT%H:%M"),
            self.end.format("%Y-%m-%dT%H:%M"),
            self.location.lat,
            self.location.lng,
            self.on_duty_non_driving.num_minutes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_task_durations() {
        let task = TimedLocation::task(
            at(8, 0),
            at(10, 30),
            Coordinates::new(50.0, 14.0),
            Duration::minutes(45),
        )
        .unwrap();

        assert!(!task.is_break());
        assert_eq!(task.driving_duration(), Duration::minutes(150));
        assert_eq!(task.total_on_duty_duration(), Duration::minutes(195));
    }

    #[test]
    fn test_break_has_no_driving_or_on_duty_time() {
        let brk = TimedLocation::rest_break(at(12, 0), Coordinates::new(50.0, 14.0), Duration::minutes(30));

        assert!(brk.is_break());
        assert_eq!(brk.end(), at(12, 30));
        assert_eq!(brk.driving_duration(), Duration::zero());
        assert_eq!(brk.total_on_duty_duration(), Duration::zero());
    }

    #[test]
    fn test_task_rejects_reversed_span() {
        let result = TimedLocation::task(at(10, 0), at(9, 0), Coordinates::new(0.0, 0.0), Duration::zero());
        assert!(matches!(result, Err(ScheduleError::InvalidTimeSpan { .. })));
    }

    #[test]
    fn test_task_rejects_negative_on_duty_time() {
        let result = TimedLocation::task(at(9, 0), at(10, 0), Coordinates::new(0.0, 0.0), Duration::minutes(-5));
        assert!(matches!(result, Err(ScheduleError::NegativeDuration { .. })));
    }

    #[test]
    fn test_task_rejects_invalid_coordinates() {
        for (lat, lng) in [(f64::NAN, 0.0), (0.0, f64::INFINITY), (91.0, 0.0), (0.0, -180.5)] {
            let result = TimedLocation::task(at(9, 0), at(10, 0), Coordinates::new(lat, lng), Duration::zero());
            assert!(
                matches!(result, Err(ScheduleError::InvalidCoordinates { .. })),
                "({}, {}) accepted",
                lat,
                lng
            );
        }
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn test_shift_preserves_duration() {
        let mut task = TimedLocation::task(at(8, 0), at(9, 15), Coordinates::new(0.0, 0.0), Duration::zero()).unwrap();
        task.shift_by(Duration::minutes(40));

        assert_eq!(task.start(), at(8, 40));
        assert_eq!(task.end(), at(9, 55));
        assert_eq!(task.driving_duration(), Duration::minutes(75));
    }

    #[test]
    fn test_display() {
        let task = TimedLocation::task(at(8, 0), at(9, 0), Coordinates::new(1.5, 2.5), Duration::minutes(20)).unwrap();
        assert_eq!(
            task.to_string(),
            "Task{startTime=2024-03-04T08:00, endTime=2024-03-04T09:00, latitude=1.5, longitude=2.5, onDutyNonDrivingTime=20m}"
        );
    }
}
