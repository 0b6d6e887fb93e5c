//! Configuration management for JukeboxBot
//!
//! Loads settings from environment variables (.env file)

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Optional guild ID for development (faster command sync)
    pub guild_id: Option<u64>,
    /// Gain every guild starts with, in 0.0..=1.0
    pub default_volume: f32,
    /// Upcoming entries listed by /queue
    pub queue_display_limit: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?;

        let guild_id = lookup("GUILD_ID")
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue("GUILD_ID".to_string(), s))
            })
            .transpose()?;

        let volume_percent = match lookup("DEFAULT_VOLUME").filter(|s| !s.is_empty()) {
            Some(s) => match s.parse::<u8>() {
                Ok(percent) if percent <= 100 => percent,
                _ => return Err(ConfigError::InvalidValue("DEFAULT_VOLUME".to_string(), s)),
            },
            None => 50,
        };

        let queue_display_limit = lookup("QUEUE_DISPLAY_LIMIT")
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| ConfigError::InvalidValue("QUEUE_DISPLAY_LIMIT".to_string(), s))
            })
            .transpose()?
            .unwrap_or(10);

        Ok(Self {
            discord_token,
            guild_id,
            default_volume: f32::from(volume_percent) / 100.0,
            queue_display_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.guild_id, None);
        assert_eq!(config.default_volume, 0.5);
        assert_eq!(config.queue_display_limit, 10);
    }

    #[test]
    fn test_missing_token() {
        let err = Config::from_vars(lookup(&[("GUILD_ID", "1")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "DISCORD_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("GUILD_ID", "1317122769942478878"),
            ("DEFAULT_VOLUME", "80"),
            ("QUEUE_DISPLAY_LIMIT", "5"),
        ]))
        .unwrap();
        assert_eq!(config.guild_id, Some(1317122769942478878));
        assert_eq!(config.default_volume, 0.8);
        assert_eq!(config.queue_display_limit, 5);
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_vars(lookup(&[("DISCORD_TOKEN", "abc"), ("GUILD_ID", "nope")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "GUILD_ID"));

        let err = Config::from_vars(lookup(&[("DISCORD_TOKEN", "abc"), ("DEFAULT_VOLUME", "150")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "DEFAULT_VOLUME"));
    }
}
