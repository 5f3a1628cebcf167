//! CLI argument parsing for the hos-scheduler binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hos-scheduler", about = "Hours-of-service duty schedule planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a JSON plan and print the resulting schedule
    Run {
        /// Plan file
        plan: PathBuf,
        /// Stop at the first rejected step
        #[arg(long)]
        strict: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate straight-line drive time between two points
    DriveTime {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lng: f64,
    },
}
