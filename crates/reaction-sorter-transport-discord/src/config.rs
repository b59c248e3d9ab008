//! Discord transport settings.

use config::ConfigError;
use reaction_sorter_core::config::SorterSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Discord transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DiscordSettings {
    /// Discord bot token.
    pub discord_token: String,
}

impl DiscordSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = reaction_sorter_core::config::build_config()?.try_deserialize()?;
        if settings.discord_token.trim().is_empty() {
            return Err(ConfigError::NotFound("discord_token".into()));
        }
        Ok(settings)
    }
}

/// Combined settings used by the Discord transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Sorter settings shared across handlers.
    pub sorter: Arc<SorterSettings>,
    /// Discord-specific settings.
    pub discord: Arc<DiscordSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(sorter: SorterSettings, discord: DiscordSettings) -> Self {
        Self {
            sorter: Arc::new(sorter),
            discord: Arc::new(discord),
        }
    }
}

/// Cooldown period (seconds) between "permission required" replies for the same user.
/// Default: 20 minutes.
pub const DENIAL_COOLDOWN_SECS: u64 = 1200;
/// Maximum cache capacity (number of users).
pub const DENIAL_CACHE_MAX_SIZE: u64 = 10_000;

/// Get denial cooldown from env or default.
///
/// Environment variable: `DENIAL_COOLDOWN_SECS`.
#[must_use]
pub fn get_denial_cooldown() -> u64 {
    std::env::var("DENIAL_COOLDOWN_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DENIAL_COOLDOWN_SECS)
}

/// Get denial cache max size from env or default.
///
/// Environment variable: `DENIAL_CACHE_MAX_SIZE`.
#[must_use]
pub fn get_denial_cache_max_size() -> u64 {
    std::env::var("DENIAL_CACHE_MAX_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DENIAL_CACHE_MAX_SIZE)
}
