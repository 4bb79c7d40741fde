use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// How renamed files are sent back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadMode {
    /// Keep the kind of the original media
    #[default]
    Auto,
    /// Always send as a document
    Document,
    /// Always send as a streamable video
    Video,
}

impl UploadMode {
    pub const ALL: [UploadMode; 3] = [UploadMode::Auto, UploadMode::Document, UploadMode::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            UploadMode::Auto => "auto",
            UploadMode::Document => "document",
            UploadMode::Video => "video",
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(UploadMode::Auto),
            "document" | "doc" => Ok(UploadMode::Document),
            "video" => Ok(UploadMode::Video),
            other => Err(format!("Unknown upload mode: {}", other)),
        }
    }
}

/// Rename preferences of a single user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettings {
    /// Prepended to every new file name
    pub prefix: Option<String>,
    /// Replaces the default caption
    pub caption: Option<String>,
    /// Telegram file id of the custom thumbnail photo
    pub thumbnail: Option<String>,
    pub upload_mode: UploadMode,
}

/// Usage counters of a single user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub files_processed: u64,
    pub total_bytes: u64,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl UserStats {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            files_processed: 0,
            total_bytes: 0,
            joined_at: now,
            last_active: now,
        }
    }
}

/// Bot-wide counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotStats {
    pub users: usize,
    pub total_files: u64,
    pub total_bytes: u64,
    pub started_at: DateTime<Utc>,
}
