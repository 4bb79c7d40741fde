//! Human-readable sizes, speeds and durations

use std::time::Duration;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with 1024-based units and two decimals
pub fn format_size(bytes: u64) -> String {
    scale(bytes as f64)
}

/// Format a throughput in bytes per second
pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{}/s", scale(bytes_per_sec))
}

/// Format a duration as `HH:MM:SS`, or `MM:SS` when under an hour
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Format a possibly-unknown remaining time
pub fn format_eta(eta: Option<Duration>) -> String {
    match eta {
        Some(duration) => format_duration(duration),
        None => "--:--".to_string(),
    }
}

fn scale(value: f64) -> String {
    let mut value = if value.is_finite() && value > 0.0 { value } else { 0.0 };
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}
