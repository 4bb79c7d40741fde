//! Handler helper functions
//!
//! Reusable responses and message formatting shared by command and
//! callback handlers.

use std::time::Duration;

use chrono::Utc;
use progress::{format_duration, format_size, format_speed};
use settings::{BotStats, UserSettings, UserStats};

use crate::constants::emoji;
use crate::media::MediaKind;
use crate::utils;

/// Outcome of a finished rename
#[derive(Debug, Clone)]
pub struct RenameSummary {
    pub file_name: String,
    pub size: u64,
    pub download_time: Duration,
    pub upload_time: Duration,
    pub kind: MediaKind,
    pub thumbnail: bool,
    pub prefix: bool,
}

fn average_speed(bytes: u64, time: Duration) -> f64 {
    let secs = time.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 / secs
    } else {
        0.0
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Format the completion message of a rename
pub fn format_summary(summary: &RenameSummary) -> String {
    format!(
        "{} Rename completed!\n\n\
        {} File: {}\n\
        {} Size: {}\n\
        {} Total time: {}\n\
        {} Download: {}\n\
        {} Upload: {}\n\
        {} Sent as: {}\n\
        {} Thumbnail: {}\n\
        {} Prefix: {}",
        emoji::SUCCESS,
        emoji::FILE,
        summary.file_name,
        emoji::SIZE,
        format_size(summary.size),
        emoji::TIME,
        format_duration(summary.download_time + summary.upload_time),
        emoji::DOWNLOAD,
        format_speed(average_speed(summary.size, summary.download_time)),
        emoji::UPLOAD,
        format_speed(average_speed(summary.size, summary.upload_time)),
        emoji::TOOL,
        summary.kind.label(),
        emoji::THUMBNAIL,
        yes_no(summary.thumbnail),
        emoji::TAG,
        yes_no(summary.prefix),
    )
}

/// Format the settings overview shown above the settings keyboard
pub fn format_settings(settings: &UserSettings) -> String {
    format!(
        "{} Your Settings:\n\n\
        Upload mode: {}\n\
        Prefix: {}\n\
        Caption: {}\n\
        Thumbnail: {}",
        emoji::TOOL,
        settings.upload_mode,
        settings.prefix.as_deref().unwrap_or("Not set"),
        settings.caption.as_deref().unwrap_or("Default"),
        if settings.thumbnail.is_some() {
            "Set"
        } else {
            "Not set"
        },
    )
}

/// Format per-user statistics
pub fn format_user_stats(stats: Option<&UserStats>) -> String {
    match stats {
        Some(stats) => format!(
            "{} Your Statistics:\n\n\
            Files renamed: {}\n\
            Data processed: {}\n\
            First seen: {}\n\
            Last active: {}",
            emoji::INFO,
            stats.files_processed,
            format_size(stats.total_bytes),
            utils::format_timestamp(stats.joined_at),
            utils::format_timestamp(stats.last_active),
        ),
        None => format!("{} You haven't renamed any files yet.", emoji::INFO),
    }
}

/// Format bot-wide statistics
pub fn format_bot_stats(stats: &BotStats) -> String {
    let uptime = (Utc::now() - stats.started_at).to_std().unwrap_or_default();
    format!(
        "{} Bot Statistics:\n\n\
        Users: {}\n\
        Files renamed: {}\n\
        Data processed: {}\n\
        Uptime: {}",
        emoji::INFO,
        stats.users,
        stats.total_files,
        format_size(stats.total_bytes),
        utils::format_uptime(uptime),
    )
}

/// Format the `/status` reply
pub fn format_status(uptime: Duration, active_transfers: usize, free_space: Option<u64>) -> String {
    format!(
        "{} Bot Status:\n\n\
        Uptime: {}\n\
        Active transfers: {}\n\
        Free disk space: {}",
        emoji::INFO,
        utils::format_uptime(uptime),
        active_transfers,
        free_space.map(format_size).unwrap_or_else(|| "Unknown".to_string()),
    )
}
