//! Configuration and settings management
//!
//! Loads sorter settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default command prefix
pub const DEFAULT_COMMAND_PREFIX: &str = "!";
/// Server that receives the greeting on startup
pub const DEFAULT_GREETING_GUILD: &str = "screenshots";
/// Channel that receives the ranked posts
pub const DEFAULT_SORTED_CHANNEL: &str = "sorted_posts";

/// Build the layered configuration source shared by all settings structs.
///
/// Order (later wins): `config/default`, `config/<RUN_MODE>`, `config/local`,
/// `APP__*` variables, plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE variables map to snake_case keys; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Sorter behaviour settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SorterSettings {
    /// Prefix that marks a chat message as a command
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Name of the server greeted on startup
    #[serde(default = "default_greeting_guild")]
    pub greeting_guild: String,
    /// Name of the channel sorted posts are written to
    #[serde(default = "default_sorted_channel")]
    pub sorted_channel_name: String,
}

fn default_command_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.to_string()
}

fn default_greeting_guild() -> String {
    DEFAULT_GREETING_GUILD.to_string()
}

fn default_sorted_channel() -> String {
    DEFAULT_SORTED_CHANNEL.to_string()
}

impl Default for SorterSettings {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            greeting_guild: default_greeting_guild(),
            sorted_channel_name: default_sorted_channel(),
        }
    }
}

impl SorterSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reaction_sorter_core::config::SorterSettings;
    ///
    /// let settings = SorterSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Single test so environment mutations do not race
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::remove_var("COMMAND_PREFIX");
        env::remove_var("SORTED_CHANNEL_NAME");

        let settings = SorterSettings::new()?;
        assert_eq!(settings.command_prefix, "!");
        assert_eq!(settings.sorted_channel_name, "sorted_posts");
        assert_eq!(settings.greeting_guild, "screenshots");

        env::set_var("COMMAND_PREFIX", "?");
        env::set_var("SORTED_CHANNEL_NAME", "");
        let settings = SorterSettings::new()?;
        assert_eq!(settings.command_prefix, "?");
        // Empty values are ignored and fall back to the default
        assert_eq!(settings.sorted_channel_name, "sorted_posts");

        env::remove_var("COMMAND_PREFIX");
        env::remove_var("SORTED_CHANNEL_NAME");
        Ok(())
    }
}
