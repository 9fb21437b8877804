// ⚙️ Configuration from environment variables

use crate::retry::RetryPolicy;
use crate::store::DEFAULT_BUSY_TIMEOUT;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB: &str = "AIRBOOKING_DB";
pub const ENV_BUSY_TIMEOUT_MS: &str = "AIRBOOKING_BUSY_TIMEOUT_MS";
pub const ENV_MAX_ATTEMPTS: &str = "AIRBOOKING_MAX_ATTEMPTS";
pub const ENV_LOG: &str = "AIRBOOKING_LOG";
pub const ENV_ADDR: &str = "AIRBOOKING_ADDR";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    /// Upper bound on any single wait for the database
    pub busy_timeout: Duration,
    pub retry: RetryPolicy,
    /// Used when RUST_LOG is unset
    pub log_filter: String,
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("airbooking.db"),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            retry: RetryPolicy::unbounded(),
            log_filter: "warn".to_string(),
            server_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(ENV_DB) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(ms) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds, got {:?}", ENV_BUSY_TIMEOUT_MS, ms))?;
            config.busy_timeout = Duration::from_millis(ms);
        }

        if let Some(attempts) = lookup(ENV_MAX_ATTEMPTS) {
            let attempts: u32 = attempts
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number, got {:?}", ENV_MAX_ATTEMPTS, attempts))?;
            config.retry = RetryPolicy::capped(attempts);
        }

        if let Some(filter) = lookup(ENV_LOG) {
            config.log_filter = filter;
        }

        if let Some(addr) = lookup(ENV_ADDR) {
            config.server_addr = addr;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.retry.max_attempts(), None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_DB, "/tmp/air.db"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_MAX_ATTEMPTS, "3"),
            (ENV_LOG, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/air.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.retry, RetryPolicy::capped(3));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_bad_numbers_name_the_variable() {
        let err = Config::from_lookup(lookup(&[(ENV_BUSY_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_BUSY_TIMEOUT_MS));

        let err = Config::from_lookup(lookup(&[(ENV_MAX_ATTEMPTS, "-2")])).unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_ATTEMPTS));
    }
}
