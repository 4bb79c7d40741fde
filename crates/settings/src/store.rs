//! Shared settings store

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::types::{BotStats, UploadMode, UserSettings, UserStats};

#[derive(Debug, Default)]
struct UserRecord {
    settings: UserSettings,
    stats: Option<UserStats>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<u64, UserRecord>,
    total_files: u64,
    total_bytes: u64,
}

/// Thread-safe in-memory store keyed by Telegram user id
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<Inner>>,
    started_at: DateTime<Utc>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            started_at: Utc::now(),
        }
    }

    /// Settings of a user, defaults if the user never changed anything
    pub fn settings(&self, user_id: u64) -> UserSettings {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .users
            .get(&user_id)
            .map(|record| record.settings.clone())
            .unwrap_or_default()
    }

    /// Set or clear the file name prefix, returning the previous one
    pub fn set_prefix(&self, user_id: u64, prefix: Option<String>) -> Option<String> {
        self.update(user_id, |settings| std::mem::replace(&mut settings.prefix, prefix))
    }

    /// Set or clear the caption, returning the previous one
    pub fn set_caption(&self, user_id: u64, caption: Option<String>) -> Option<String> {
        self.update(user_id, |settings| std::mem::replace(&mut settings.caption, caption))
    }

    /// Set or clear the thumbnail file id, returning the previous one
    pub fn set_thumbnail(&self, user_id: u64, file_id: Option<String>) -> Option<String> {
        self.update(user_id, |settings| std::mem::replace(&mut settings.thumbnail, file_id))
    }

    pub fn set_upload_mode(&self, user_id: u64, mode: UploadMode) -> UploadMode {
        self.update(user_id, |settings| std::mem::replace(&mut settings.upload_mode, mode))
    }

    /// Register activity of a user, creating their stats on first contact
    pub fn touch(&self, user_id: u64) {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let record = inner.users.entry(user_id).or_default();
        match record.stats.as_mut() {
            Some(stats) => stats.last_active = now,
            None => {
                tracing::debug!("New user: {}", user_id);
                record.stats = Some(UserStats::new(now));
            }
        }
    }

    /// Count a successfully renamed file
    pub fn record_file(&self, user_id: u64, bytes: u64) {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.total_files += 1;
        inner.total_bytes = inner.total_bytes.saturating_add(bytes);

        let stats = inner
            .users
            .entry(user_id)
            .or_default()
            .stats
            .get_or_insert_with(|| UserStats::new(now));
        stats.files_processed += 1;
        stats.total_bytes = stats.total_bytes.saturating_add(bytes);
        stats.last_active = now;
    }

    pub fn user_stats(&self, user_id: u64) -> Option<UserStats> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.users.get(&user_id).and_then(|record| record.stats.clone())
    }

    pub fn bot_stats(&self) -> BotStats {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        BotStats {
            users: inner.users.values().filter(|r| r.stats.is_some()).count(),
            total_files: inner.total_files,
            total_bytes: inner.total_bytes,
            started_at: self.started_at,
        }
    }

    fn update<T>(&self, user_id: u64, f: impl FnOnce(&mut UserSettings) -> T) -> T {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut inner.users.entry(user_id).or_default().settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_unknown_user() {
        let store = SettingsStore::new();
        assert_eq!(store.settings(1), UserSettings::default());
        assert!(store.user_stats(1).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = SettingsStore::new();

        assert_eq!(store.set_prefix(1, Some("[A] ".into())), None);
        assert_eq!(store.set_prefix(1, Some("[B] ".into())), Some("[A] ".into()));
        assert_eq!(store.settings(1).prefix.as_deref(), Some("[B] "));

        assert_eq!(store.set_prefix(1, None), Some("[B] ".into()));
        assert_eq!(store.settings(1).prefix, None);
    }

    #[test]
    fn test_users_are_independent() {
        let store = SettingsStore::new();
        store.set_caption(1, Some("one".into()));
        store.set_thumbnail(2, Some("file-id".into()));
        store.set_upload_mode(2, UploadMode::Video);

        let one = store.settings(1);
        let two = store.settings(2);
        assert_eq!(one.caption.as_deref(), Some("one"));
        assert_eq!(one.thumbnail, None);
        assert_eq!(one.upload_mode, UploadMode::Auto);
        assert_eq!(two.caption, None);
        assert_eq!(two.thumbnail.as_deref(), Some("file-id"));
        assert_eq!(two.upload_mode, UploadMode::Video);
    }

    #[test]
    fn test_stats_accumulate() {
        let store = SettingsStore::new();
        store.touch(1);
        store.touch(1);
        store.record_file(1, 100);
        store.record_file(1, 50);
        store.record_file(2, 7);

        let stats = store.user_stats(1).unwrap();
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.total_bytes, 150);
        assert!(stats.last_active >= stats.joined_at);

        let bot = store.bot_stats();
        assert_eq!(bot.users, 2);
        assert_eq!(bot.total_files, 3);
        assert_eq!(bot.total_bytes, 157);
    }

    #[test]
    fn test_settings_only_user_is_not_counted() {
        let store = SettingsStore::new();
        store.set_prefix(9, Some("x".into()));
        assert_eq!(store.bot_stats().users, 0);
    }

    #[test]
    fn test_clones_share_state() {
        let store = SettingsStore::new();
        let other = store.clone();
        other.set_caption(5, Some("shared".into()));
        assert_eq!(store.settings(5).caption.as_deref(), Some("shared"));
    }
}
