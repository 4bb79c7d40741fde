//! Shared state handed to every handler

use std::sync::Arc;

use settings::SettingsStore;

use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::transfers::TransferRegistry;

/// Everything handlers need besides the bot and the update.
///
/// Cloning is cheap; all clones share the same underlying state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub settings: SettingsStore,
    pub transfers: TransferRegistry,
    pub limiter: Arc<RateLimiter>,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        Self {
            config: Arc::new(config),
            settings: SettingsStore::new(),
            transfers: TransferRegistry::new(),
            limiter,
        }
    }
}
