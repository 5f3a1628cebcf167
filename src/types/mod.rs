//! Type definitions

pub mod limits;
pub mod location;
pub mod plan;
pub mod power;

pub use limits::*;
pub use location::*;
pub use plan::*;
pub use power::*;

use chrono::Duration;

/// Render a duration as `2h30m`.
pub fn format_duration(d: Duration) -> String {
    format!("{}h{}m", d.num_hours(), d.num_minutes() % 60)
}
