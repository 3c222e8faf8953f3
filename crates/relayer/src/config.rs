//! Configuration for the relayer.

use std::str::FromStr;
use std::time::Duration;

use crate::relay::DEFAULT_HISTORY_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}: invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Relayer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Fixed for the life of the process.
    pub history_size: usize,
    pub ping_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 3000u16)?;
        let history_size = parse_var("HISTORY_SIZE", DEFAULT_HISTORY_SIZE)?;
        if history_size == 0 {
            return Err(ConfigError::Zero("HISTORY_SIZE"));
        }
        let ping_interval_secs = parse_var("PING_INTERVAL_SECS", 30u64)?;
        if ping_interval_secs == 0 {
            return Err(ConfigError::Zero("PING_INTERVAL_SECS"));
        }

        Ok(Self {
            host,
            port,
            history_size,
            ping_interval: Duration::from_secs(ping_interval_secs),
        })
    }

    pub fn for_test(history_size: usize) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            history_size,
            ping_interval: Duration::from_secs(30),
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Uses variable names no other test reads, so it can run in parallel.
    #[test]
    fn parse_var_default_and_invalid() {
        std::env::remove_var("RELAYER_TEST_UNSET");
        assert_eq!(parse_var("RELAYER_TEST_UNSET", 7u16).unwrap(), 7);

        std::env::set_var("RELAYER_TEST_NUM", " 42 ");
        assert_eq!(parse_var("RELAYER_TEST_NUM", 0usize).unwrap(), 42);

        std::env::set_var("RELAYER_TEST_BAD", "lots");
        let err = parse_var("RELAYER_TEST_BAD", 0usize).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "RELAYER_TEST_BAD", .. }));
    }

    #[test]
    fn for_test_uses_loopback() {
        let config = Config::for_test(5);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.history_size, 5);
    }
}
