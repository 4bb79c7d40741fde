//! Runtime configuration read from the environment

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use progress::ProgressPolicy;
use teloxide::types::{ChatId, Recipient};
use teloxide::Bot;
use url::Url;

use crate::constants::{LOCAL_API_MAX_FILE_SIZE, PUBLIC_API_MAX_FILE_SIZE};
use crate::error::{BotError, BotResult};

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token
    pub token: String,
    /// Local Bot API server, lifts the public file size limits
    pub api_url: Option<Url>,
    /// Where files are staged between download and upload
    pub download_dir: PathBuf,
    /// Largest file accepted for renaming
    pub max_file_size: u64,
    /// Progress sampling and status edit throttling
    pub progress: ProgressPolicy,
    /// Minimum interval between rate-limited actions of one user
    pub rate_limit: Duration,
    /// Staged files older than this are removed by the cleanup task
    pub file_max_age: Duration,
    /// How often the cleanup task runs
    pub cleanup_interval: Duration,
    /// Channel users must join before using the bot
    pub updates_channel: Option<Recipient>,
    /// Users allowed to run admin commands
    pub admins: Vec<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> BotResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("BOT_TOKEN")
            .or_else(|| get("TELOXIDE_TOKEN"))
            .ok_or_else(|| BotError::Config("BOT_TOKEN must be set in .env file".to_string()))?;

        let api_url = get("BOT_API_URL")
            .map(|raw| {
                Url::parse(raw.trim())
                    .map_err(|e| BotError::Config(format!("BOT_API_URL is not a valid URL: {}", e)))
            })
            .transpose()?;

        let default_max = if api_url.is_some() {
            LOCAL_API_MAX_FILE_SIZE
        } else {
            PUBLIC_API_MAX_FILE_SIZE
        };

        let progress = ProgressPolicy {
            min_sample_interval: Duration::from_millis(parse_var(&get, "SAMPLE_INTERVAL_MS", 100)?),
            ui_throttle: Duration::from_millis(parse_nonzero(&get, "PROGRESS_INTERVAL_MS", 1000)?),
        };

        Ok(Self {
            token,
            api_url,
            download_dir: get("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("downloads")),
            max_file_size: parse_var(&get, "MAX_FILE_SIZE", default_max)?,
            progress,
            rate_limit: Duration::from_secs(parse_var(&get, "RATE_LIMIT_SECONDS", 1)?),
            file_max_age: Duration::from_secs(parse_nonzero(&get, "FILE_MAX_AGE_SECS", 1200)?),
            cleanup_interval: Duration::from_secs(parse_nonzero(&get, "CLEANUP_INTERVAL_SECS", 300)?),
            updates_channel: get("UPDATES_CHANNEL").map(|raw| parse_channel(&raw)),
            admins: get("ADMINS")
                .or_else(|| get("ADMIN"))
                .map(|raw| parse_admins(&raw))
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Build the bot client for this configuration
    pub fn bot(&self) -> Bot {
        let bot = Bot::new(self.token.clone());
        match &self.api_url {
            Some(url) => bot.set_api_url(url.clone()),
            None => bot,
        }
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admins.contains(&user_id)
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> BotResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| BotError::Config(format!("{} is invalid: {}", key, e))),
        None => Ok(default),
    }
}

/// Intervals driving timers and edit throttling must not be zero
fn parse_nonzero<G>(get: &G, key: &str, default: u64) -> BotResult<u64>
where
    G: Fn(&str) -> Option<String>,
{
    match parse_var(get, key, default)? {
        0 => Err(BotError::Config(format!("{} must be greater than zero", key))),
        value => Ok(value),
    }
}

/// `@username` or a numeric chat id such as `-1001234567890`
fn parse_channel(raw: &str) -> Recipient {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if raw.starts_with('@') => Recipient::ChannelUsername(raw.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{}", raw)),
    }
}

/// User ids separated by whitespace or commas
fn parse_admins(raw: &str) -> BotResult<Vec<u64>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse()
                .map_err(|e| BotError::Config(format!("ADMINS entry {:?} is invalid: {}", id, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> BotResult<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(cfg.token, "123:abc");
        assert!(cfg.api_url.is_none());
        assert_eq!(cfg.download_dir, PathBuf::from("downloads"));
        assert_eq!(cfg.max_file_size, PUBLIC_API_MAX_FILE_SIZE);
        assert_eq!(cfg.progress, ProgressPolicy::default());
        assert_eq!(cfg.rate_limit, Duration::from_secs(1));
        assert_eq!(cfg.file_max_age, Duration::from_secs(1200));
        assert_eq!(cfg.cleanup_interval, Duration::from_secs(300));
        assert!(cfg.updates_channel.is_none());
        assert!(cfg.admins.is_empty());
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(config(&[]), Err(BotError::Config(_))));
        assert!(matches!(config(&[("BOT_TOKEN", "  ")]), Err(BotError::Config(_))));
    }

    #[test]
    fn test_teloxide_token_fallback() {
        let cfg = config(&[("TELOXIDE_TOKEN", "42:xyz")]).unwrap();
        assert_eq!(cfg.token, "42:xyz");
    }

    #[test]
    fn test_local_api_raises_default_limit() {
        let cfg = config(&[("BOT_TOKEN", "t"), ("BOT_API_URL", "http://localhost:8081")]).unwrap();
        assert_eq!(cfg.api_url.unwrap().as_str(), "http://localhost:8081/");
        assert_eq!(cfg.max_file_size, LOCAL_API_MAX_FILE_SIZE);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("BOT_TOKEN", "t"),
            ("DOWNLOAD_DIR", "/tmp/rename"),
            ("MAX_FILE_SIZE", "1048576"),
            ("PROGRESS_INTERVAL_MS", "2500"),
            ("SAMPLE_INTERVAL_MS", "250"),
            ("RATE_LIMIT_SECONDS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.download_dir, PathBuf::from("/tmp/rename"));
        assert_eq!(cfg.max_file_size, 1048576);
        assert_eq!(cfg.progress.ui_throttle, Duration::from_millis(2500));
        assert_eq!(cfg.progress.min_sample_interval, Duration::from_millis(250));
        assert_eq!(cfg.rate_limit, Duration::ZERO);
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(
            config(&[("BOT_TOKEN", "t"), ("MAX_FILE_SIZE", "big")]),
            Err(BotError::Config(_))
        ));
        assert!(matches!(
            config(&[("BOT_TOKEN", "t"), ("BOT_API_URL", "not a url")]),
            Err(BotError::Config(_))
        ));
        assert!(matches!(
            config(&[("BOT_TOKEN", "t"), ("PROGRESS_INTERVAL_MS", "-1")]),
            Err(BotError::Config(_))
        ));
        assert!(matches!(
            config(&[("BOT_TOKEN", "t"), ("ADMINS", "12 bob")]),
            Err(BotError::Config(_))
        ));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        for key in ["CLEANUP_INTERVAL_SECS", "PROGRESS_INTERVAL_MS", "FILE_MAX_AGE_SECS"] {
            match config(&[("BOT_TOKEN", "t"), (key, "0")]) {
                Err(BotError::Config(msg)) => assert_eq!(msg, format!("{} must be greater than zero", key)),
                other => panic!("{} = 0 was accepted: {:?}", key, other.map(|_| ())),
            }
        }

        // Sampling every chunk is fine
        let cfg = config(&[("BOT_TOKEN", "t"), ("SAMPLE_INTERVAL_MS", "0")]).unwrap();
        assert_eq!(cfg.progress.min_sample_interval, Duration::ZERO);
    }

    #[test]
    fn test_updates_channel() {
        let cfg = config(&[("BOT_TOKEN", "t"), ("UPDATES_CHANNEL", "my_updates")]).unwrap();
        assert_eq!(
            cfg.updates_channel,
            Some(Recipient::ChannelUsername("@my_updates".to_string()))
        );

        let cfg = config(&[("BOT_TOKEN", "t"), ("UPDATES_CHANNEL", "@my_updates")]).unwrap();
        assert_eq!(
            cfg.updates_channel,
            Some(Recipient::ChannelUsername("@my_updates".to_string()))
        );

        let cfg = config(&[("BOT_TOKEN", "t"), ("UPDATES_CHANNEL", "-1001234567890")]).unwrap();
        assert_eq!(cfg.updates_channel, Some(Recipient::Id(ChatId(-1001234567890))));
    }

    #[test]
    fn test_admins() {
        let cfg = config(&[("BOT_TOKEN", "t"), ("ADMINS", "111 222,333")]).unwrap();
        assert_eq!(cfg.admins, vec![111, 222, 333]);
        assert!(cfg.is_admin(222));
        assert!(!cfg.is_admin(444));

        let cfg = config(&[("BOT_TOKEN", "t"), ("ADMIN", "7")]).unwrap();
        assert_eq!(cfg.admins, vec![7]);
    }
}
