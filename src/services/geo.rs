//! Geographic calculations

use chrono::Duration;

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average speed in km/h for drive time estimation
const AVERAGE_SPEED_KMH: f64 = 50.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Estimate drive time between two points, rounded to the nearest minute
pub fn drive_time(from: &Coordinates, to: &Coordinates) -> Duration {
    let hours = haversine_distance(from, to) / AVERAGE_SPEED_KMH;
    Duration::minutes((hours * 60.0).round() as i64)
}
