//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! ladder-ratings engine, including environment variable and TOML file
//! loading and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Ladder name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "ladder-ratings".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("LADDER_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(system) = env::var("RATING_SYSTEM") {
            config.rating.system = parse_env("RATING_SYSTEM", &system)?;
        }
        if let Ok(k) = env::var("ELO_K_FACTOR") {
            config.rating.elo.k = parse_env("ELO_K_FACTOR", &k)?;
        }
        if let Ok(tau) = env::var("GLICKO2_TAU") {
            config.rating.glicko2.tau = parse_env("GLICKO2_TAU", &tau)?;
        }
        if let Ok(hours) = env::var("GLICKO2_RATING_PERIOD_HOURS") {
            config.rating.glicko2.rating_period_hours =
                parse_env("GLICKO2_RATING_PERIOD_HOURS", &hours)?;
        }
        if let Ok(probability) = env::var("TRUESKILL_DRAW_PROBABILITY") {
            config.rating.trueskill.draw_probability =
                parse_env("TRUESKILL_DRAW_PROBABILITY", &probability)?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take default values
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Ladder name cannot be empty"));
    }

    config.rating.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::registry::RatingSystemKind;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let config = AppConfig::from_toml_str(
            r#"
            [service]
            name = "ragl"
            log_level = "debug"

            [rating]
            system = "elo"

            [rating.elo]
            k = 24.0
            "#,
        )
        .unwrap();

        assert_eq!(config.service.name, "ragl");
        assert_eq!(config.rating.system, RatingSystemKind::Elo);
        assert_eq!(config.rating.elo.k, 24.0);
        assert_eq!(config.rating.elo.initial_rating, 1000.0);
    }

    #[test]
    fn test_from_toml_str_rejects_invalid_values() {
        let result = AppConfig::from_toml_str(
            r#"
            [rating.glicko2]
            rating_period_hours = 0
            "#,
        );
        assert!(result.is_err());

        let result = AppConfig::from_toml_str(r#"rating = { system = "whr" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let result = AppConfig::from_file(Path::new("/nonexistent/ladder.toml"));
        assert!(result.is_err());
    }
}
