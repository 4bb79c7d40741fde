//! Utility functions for formatting and parsing

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};
use teloxide::types::Message;

use crate::constants::{MAX_CAPTION_LEN, MAX_FILE_NAME_LEN};

/// Longest extension kept intact when a name has to be shortened
const MAX_EXTENSION_LEN: usize = 16;

/// Placeholder replaced by the new file name in caption templates
pub const FILENAME_PLACEHOLDER: &str = "{filename}";

/// Turn user input into a safe file name
///
/// Strips any directory part, replaces characters that are reserved on
/// common file systems and caps the result at 255 bytes, keeping the
/// extension. Returns `None` when nothing usable is left.
pub fn sanitize_filename(input: &str) -> Option<String> {
    let base = input.trim().rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }

    Some(truncate_keeping_extension(cleaned, MAX_FILE_NAME_LEN))
}

fn truncate_keeping_extension(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LEN + 1 => name.split_at(dot),
        _ => (name, ""),
    };

    let budget = max - ext.len();
    format!("{}{}", truncate_bytes(stem, budget), ext)
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Final file name: sanitized request with the user's prefix applied
pub fn build_file_name(prefix: Option<&str>, requested: &str) -> Option<String> {
    let name = sanitize_filename(requested)?;
    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => sanitize_filename(&format!("{} {}", prefix, name)),
        None => Some(name),
    }
}

/// Unique staging file name for a user's download
pub fn temp_file_name(user_id: u64) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha1::new();
    hasher.update(user_id.to_le_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(seq.to_le_bytes());
    let hash = format!("{:x}", hasher.finalize());

    format!("{}_{}.part", user_id, &hash[..12])
}

/// Id of the user who sent `msg`, falling back to the chat id
pub fn user_id(msg: &Message) -> u64 {
    msg.from()
        .map(|user| user.id.0)
        .unwrap_or(msg.chat.id.0 as u64)
}

/// Caption for a renamed file
///
/// Uses the user's template when set, replacing `{filename}`, and caps the
/// result at Telegram's caption limit.
pub fn render_caption(template: Option<&str>, file_name: &str) -> String {
    let caption = match template {
        Some(template) => template.replace(FILENAME_PLACEHOLDER, file_name),
        None => format!("📁 {}", file_name),
    };

    if caption.chars().count() > MAX_CAPTION_LEN {
        caption.chars().take(MAX_CAPTION_LEN).collect()
    } else {
        caption
    }
}

/// Format a UTC time for display
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format an uptime as days, hours and minutes
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("movie.mkv").as_deref(), Some("movie.mkv"));
        assert_eq!(sanitize_filename("  spaced.txt  ").as_deref(), Some("spaced.txt"));
        assert_eq!(sanitize_filename("a<b>c:d.mp4").as_deref(), Some("a_b_c_d.mp4"));
        assert_eq!(sanitize_filename("what?*\"|.zip").as_deref(), Some("what____.zip"));
        assert_eq!(sanitize_filename("tab\there").as_deref(), Some("tab_here"));
    }

    #[test]
    fn test_sanitize_strips_paths() {
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("C:\\Users\\me\\file.pdf").as_deref(), Some("file.pdf"));
        assert_eq!(sanitize_filename("dir/"), None);
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("   "), None);
        assert_eq!(sanitize_filename("."), None);
        assert_eq!(sanitize_filename(".."), None);
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = format!("{}.mkv", "a".repeat(400));
        let name = sanitize_filename(&long).unwrap();
        assert_eq!(name.len(), MAX_FILE_NAME_LEN);
        assert!(name.ends_with(".mkv"));

        // Multi-byte characters are never split
        let wide = format!("{}.txt", "é".repeat(200));
        let name = sanitize_filename(&wide).unwrap();
        assert!(name.len() <= MAX_FILE_NAME_LEN);
        assert!(name.ends_with(".txt"));

        // Absurd extensions are not preserved
        let no_ext = format!("x.{}", "y".repeat(300));
        assert_eq!(sanitize_filename(&no_ext).unwrap().len(), MAX_FILE_NAME_LEN);
    }

    #[test]
    fn test_build_file_name() {
        assert_eq!(build_file_name(None, "a.mp4").as_deref(), Some("a.mp4"));
        assert_eq!(build_file_name(Some("[HD]"), "a.mp4").as_deref(), Some("[HD] a.mp4"));
        assert_eq!(build_file_name(Some("  "), "a.mp4").as_deref(), Some("a.mp4"));
        assert_eq!(build_file_name(Some("@chan"), "   "), None);
    }

    #[test]
    fn test_temp_file_name_is_unique() {
        let a = temp_file_name(42);
        let b = temp_file_name(42);
        assert_ne!(a, b);
        assert!(a.starts_with("42_"));
        assert!(a.ends_with(".part"));
        assert_eq!(a.len(), "42_".len() + 12 + ".part".len());
    }

    #[test]
    fn test_render_caption() {
        assert_eq!(render_caption(None, "a.mkv"), "📁 a.mkv");
        assert_eq!(
            render_caption(Some("Now showing: {filename}!"), "a.mkv"),
            "Now showing: a.mkv!"
        );
        assert_eq!(render_caption(Some("static"), "a.mkv"), "static");

        let long = "x".repeat(2000);
        assert_eq!(render_caption(Some(&long), "a").chars().count(), MAX_CAPTION_LEN);
    }

    #[test]
    fn test_format_timestamp() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        assert_eq!(format_timestamp(time), "2024-01-01 12:30:00 UTC");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(59)), "0m 59s");
        assert_eq!(format_uptime(Duration::from_secs(3_660)), "1h 1m");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m");
    }
}
