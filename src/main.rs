//! HOS Scheduler - command-line front end
//!
//! Replays duty plans against a driver's schedule and prints the result.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hos_scheduler::config::Config;
use hos_scheduler::services::{geo, plan_runner};
use hos_scheduler::types::{format_duration, Coordinates};

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // File appender for persistent logs (daily rotation), only when LOGS_DIR is set
    let (file_layer, _guard) = match &config.logs_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "hos-scheduler.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    info!("Configuration loaded");

    match cli.command {
        Command::Run { plan, strict, json } => {
            let plan_data = plan_runner::load_plan(&plan)?;
            let report = match plan_runner::run_plan(&plan_data, strict || config.strict) {
                Ok(report) => report,
                Err(e) => {
                    error!("Plan run failed: {:#}", e);
                    return Err(e);
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for (i, period) in report.periods.iter().enumerate() {
                    println!("Duty period {}:", i + 1);
                    for (n, entry) in period.entries.iter().enumerate() {
                        println!(
                            "  {:>2}. {:?} {} -> {} ({}, {}) driving {} min, on duty {} min",
                            n + 1,
                            entry.kind,
                            entry.start,
                            entry.end,
                            entry.lat,
                            entry.lng,
                            entry.driving_minutes,
                            entry.on_duty_minutes
                        );
                    }
                    println!(
                        "  Accumulated: drive {} min, on duty {} min, weekly {} min",
                        period.power.drive_minutes,
                        period.power.on_duty_minutes,
                        period.power.weekly_on_duty_minutes
                    );
                    for rejection in &period.rejections {
                        println!("  Step {} rejected: {}", rejection.step, rejection.reason);
                    }
                }
            }
            info!("Plan finished with {} rejected steps", report.rejection_count());
        }
        Command::DriveTime {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => {
            let from = Coordinates::new(from_lat, from_lng);
            let to = Coordinates::new(to_lat, to_lng);
            for point in [&from, &to] {
                if !point.is_valid() {
                    anyhow::bail!("Invalid coordinates ({}, {})", point.lat, point.lng);
                }
            }
            println!(
                "{:.1} km, {}",
                geo::haversine_distance(&from, &to),
                format_duration(geo::drive_time(&from, &to))
            );
        }
    }

    Ok(())
}
