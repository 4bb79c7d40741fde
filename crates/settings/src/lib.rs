//! Per-user rename settings and usage statistics
//!
//! Settings live in memory only and reset when the bot restarts. Every
//! write replaces the previous value for that user.

mod store;
mod types;

pub use store::SettingsStore;
pub use types::{BotStats, UploadMode, UserSettings, UserStats};
