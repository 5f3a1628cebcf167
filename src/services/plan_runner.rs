//! Replays a JSON plan against a driver's schedule.
//!
//! A `restart` step closes the current duty period, applies the 34-hour
//! restart to the accumulator and opens a fresh schedule bound to it.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::ScheduleError;
use crate::services::schedule::DrivingSchedule;
use crate::types::{
    EntrySnapshot, PeriodReport, Plan, PlanReport, PlanStep, PowerSnapshot, Rejection,
};

/// Read and parse a plan file
pub fn load_plan(path: &Path) -> Result<Plan> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let plan = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse plan file {}", path.display()))?;
    Ok(plan)
}

fn close_period(schedule: &DrivingSchedule, rejections: Vec<Rejection>) -> PeriodReport {
    PeriodReport {
        entries: schedule.entries().iter().map(EntrySnapshot::from).collect(),
        power: PowerSnapshot::from(schedule.power()),
        rejections,
    }
}

/// Apply every step of `plan`.
///
/// Refused steps are recorded and skipped; with `strict` the first refusal
/// ends the run with an error instead.
pub fn run_plan(plan: &Plan, strict: bool) -> Result<PlanReport> {
    let power = plan.power.to_power().context("Invalid initial power")?;
    let mut schedule = DrivingSchedule::new(power);
    let mut rejections = Vec::new();
    let mut periods = Vec::new();

    for (step_no, step) in plan.steps.iter().enumerate() {
        let result = match step {
            PlanStep::Add { task } => task.to_task().and_then(|t| schedule.add_task(t)),
            PlanStep::Insert { index, task } => {
                task.to_task().and_then(|t| schedule.insert_task(*index, t))
            }
            PlanStep::Restart { at } => {
                info!("Step {}: 34-hour restart at {}", step_no, at);
                periods.push(close_period(&schedule, std::mem::take(&mut rejections)));
                let mut power = schedule.into_power();
                power.apply_34_hour_restart_at(*at);
                schedule = DrivingSchedule::new(power);
                continue;
            }
        };

        if let Err(e) = result {
            if strict {
                return Err(e).with_context(|| format!("Plan step {} rejected", step_no));
            }
            warn!("Step {} rejected: {}", step_no, e);
            rejections.push(rejection(step_no, &e));
        }
    }

    periods.push(close_period(&schedule, rejections));
    Ok(PlanReport { periods })
}

fn rejection(step: usize, error: &ScheduleError) -> Rejection {
    Rejection {
        step,
        cap: error.violation().map(|v| v.cap),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryKind, HosCap, PowerSpec, TaskSpec};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::Write;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn hour_task(d: u32, h: u32) -> TaskSpec {
        TaskSpec {
            start: at(d, h, 0),
            end: at(d, h + 1, 0),
            lat: 50.0,
            lng: 14.0,
            on_duty_minutes: 0,
        }
    }

    fn fresh_power(d: u32) -> PowerSpec {
        PowerSpec {
            drive_minutes: 0,
            on_duty_minutes: 0,
            weekly_on_duty_minutes: 0,
            duty_start: at(d, 0, 0),
        }
    }

    #[test]
    fn test_rejections_are_recorded_and_skipped() {
        let plan = Plan {
            power: fresh_power(4),
            steps: vec![
                PlanStep::Add { task: hour_task(4, 0) },
                // First entry ends at 15:00, past the 14-hour window
                PlanStep::Insert { index: 0, task: hour_task(4, 14) },
                PlanStep::Insert { index: 7, task: hour_task(4, 1) },
                PlanStep::Add { task: hour_task(4, 1) },
            ],
        };

        let report = run_plan(&plan, false).unwrap();

        assert_eq!(report.periods.len(), 1);
        let period = &report.periods[0];
        assert_eq!(period.entries.len(), 2);
        assert_eq!(period.power.drive_minutes, 120);
        assert_eq!(period.rejections.len(), 2);
        assert_eq!(period.rejections[0].step, 1);
        assert_eq!(period.rejections[0].cap, Some(HosCap::DutyWindow));
        assert_eq!(period.rejections[1].cap, None);
        assert_eq!(report.rejection_count(), 2);
    }

    #[test]
    fn test_strict_mode_stops_at_first_rejection() {
        let plan = Plan {
            power: fresh_power(4),
            steps: vec![PlanStep::Insert { index: 3, task: hour_task(4, 0) }],
        };

        let err = run_plan(&plan, true).unwrap_err();
        assert!(err.to_string().contains("Plan step 0 rejected"));
    }

    #[test]
    fn test_restart_opens_new_period() {
        let mut steps: Vec<PlanStep> = (0..8).map(|h| PlanStep::Add { task: hour_task(4, h) }).collect();
        steps.push(PlanStep::Restart { at: at(6, 6, 0) });
        steps.push(PlanStep::Add { task: hour_task(6, 6) });
        let plan = Plan { power: fresh_power(4), steps };

        let report = run_plan(&plan, false).unwrap();

        assert_eq!(report.periods.len(), 2);
        let first = &report.periods[0];
        assert_eq!(first.entries.len(), 9);
        assert_eq!(first.entries[7].kind, EntryKind::Break);
        assert_eq!(first.power.drive_minutes, 8 * 60);

        let second = &report.periods[1];
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.power.drive_minutes, 60);
        assert_eq!(second.power.weekly_on_duty_minutes, 60);
        assert_eq!(second.power.duty_start, at(6, 6, 0));
    }

    #[test]
    fn test_huge_carried_minutes_fail_instead_of_panicking() {
        let json = r#"{"power":{"driveMinutes":9223372036854775807,"dutyStart":"2024-03-04T06:00:00"},"steps":[]}"#;
        let plan: Plan = serde_json::from_str(json).unwrap();

        let err = run_plan(&plan, false).unwrap_err();
        assert!(err.to_string().contains("Invalid initial power"));
        assert!(matches!(
            err.downcast_ref::<ScheduleError>(),
            Some(ScheduleError::DurationOutOfRange { .. })
        ));
    }

    #[test]
    fn test_huge_task_minutes_are_recorded_as_rejection() {
        let mut task = hour_task(4, 0);
        task.on_duty_minutes = i64::MAX;
        let plan = Plan {
            power: fresh_power(4),
            steps: vec![PlanStep::Add { task }],
        };

        let report = run_plan(&plan, false).unwrap();
        assert_eq!(report.periods[0].entries.len(), 0);
        assert_eq!(report.rejection_count(), 1);
    }

    #[test]
    fn test_load_plan_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "power": {{ "dutyStart": "2024-03-04T06:00:00" }},
                "steps": [
                    {{ "action": "add", "task": {{ "start": "2024-03-04T06:00:00", "end": "2024-03-04T08:00:00", "lat": 50.0, "lng": 14.0 }} }}
                ]
            }}"#
        )
        .unwrap();

        let plan = load_plan(file.path()).unwrap();
        let report = run_plan(&plan, true).unwrap();
        assert_eq!(report.periods[0].power.drive_minutes, 120);
    }

    #[test]
    fn test_load_plan_reports_path_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_plan(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse plan file"));
    }
}
