//! Status text rendering

use crate::format::{format_duration, format_eta, format_size, format_speed};
use crate::session::Metrics;

/// Number of glyphs in the progress bar
pub const BAR_SEGMENTS: usize = 20;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Bar with one filled segment per full 5%
pub fn progress_bar(percentage: f64) -> String {
    let filled = if percentage.is_finite() {
        (percentage / 5.0).floor().clamp(0.0, BAR_SEGMENTS as f64) as usize
    } else {
        0
    };

    let mut bar = String::with_capacity(BAR_SEGMENTS * 3 + 2);
    bar.push('[');
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(BAR_SEGMENTS - filled));
    bar.push(']');
    bar
}

/// Percentage cut to one decimal, so it never reads 100.0% before the bar is full
fn truncated_percentage(percentage: f64) -> f64 {
    if percentage.is_finite() {
        // Absorb representation error such as 57.3 * 10.0 = 572.999...
        ((percentage * 10.0) + 1e-9).floor() / 10.0
    } else {
        0.0
    }
}

/// Render the status block shown in the progress message.
///
/// Output depends only on the arguments.
pub fn render_text(metrics: &Metrics, filename: &str) -> String {
    let mut text = String::with_capacity(256);
    text.push_str(metrics.direction.label());
    text.push_str("\n\n");

    if !filename.is_empty() {
        text.push_str("📁 File: ");
        text.push_str(filename);
        text.push('\n');
    }

    text.push_str(&format!(
        "{} {:.1}%\n\
        📦 Size: {} / {}\n\
        ⚡ Speed: {}\n\
        ⏱ ETA: {}\n\
        ⏳ Elapsed: {}",
        progress_bar(metrics.percentage),
        truncated_percentage(metrics.percentage),
        format_size(metrics.transferred_bytes),
        format_size(metrics.total_bytes),
        format_speed(metrics.average_speed),
        format_eta(metrics.eta),
        format_duration(metrics.elapsed),
    ));

    text
}
