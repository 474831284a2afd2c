//! Configuration module

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::fleet::{DEFAULT_DEVICE_COUNT, MAX_DEVICE_COUNT};

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {name} value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("DEVICE_COUNT must be between 1 and {max}, got {count}")]
    DeviceCountOutOfRange { count: usize, max: usize },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Devices per snapshot
    pub device_count: usize,

    /// Directory holding the dashboard page
    pub static_dir: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let device_count = parse_var(&lookup, "DEVICE_COUNT", DEFAULT_DEVICE_COUNT)?;

        if device_count == 0 || device_count > MAX_DEVICE_COUNT {
            return Err(ConfigError::DeviceCountOutOfRange {
                count: device_count,
                max: MAX_DEVICE_COUNT,
            });
        }

        Ok(Self {
            port,
            device_count,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.device_count, 5);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("DEVICE_COUNT", "12"),
            ("STATIC_DIR", "/srv/dashboard"),
            ("ENVIRONMENT", "production"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.device_count, 12);
        assert_eq!(config.static_dir, PathBuf::from("/srv/dashboard"));
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            load(&[("PORT", "http")]).unwrap_err(),
            ConfigError::Invalid { name: "PORT", value: "http".to_string() }
        );
        assert!(matches!(
            load(&[("DEVICE_COUNT", "-3")]),
            Err(ConfigError::Invalid { name: "DEVICE_COUNT", .. })
        ));
        assert_eq!(
            load(&[("DEVICE_COUNT", "0")]).unwrap_err(),
            ConfigError::DeviceCountOutOfRange { count: 0, max: MAX_DEVICE_COUNT }
        );
        assert!(load(&[("DEVICE_COUNT", "10001")]).is_err());
    }
}
