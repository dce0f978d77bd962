//! Environment-driven service configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::aggregator::DEFAULT_FETCH_TIMEOUT;
use crate::broadcast::DEFAULT_BROADCAST_CAPACITY;
use crate::cache::DEFAULT_CACHE_TTL;
use crate::poller::DEFAULT_POLL_INTERVAL;

/// Runtime settings, read once at startup. Unset or unparsable variables
/// fall back to defaults with a warning rather than aborting.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub poll_interval: Duration,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub bind: String,
    pub port: u16,
    pub broadcast_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            bind: "0.0.0.0".to_owned(),
            port: 3001,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: env_parse("TOKENTIDE_POLL_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            cache_ttl: env_parse("TOKENTIDE_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            fetch_timeout: env_parse("TOKENTIDE_FETCH_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_timeout),
            bind: env::var("TOKENTIDE_BIND").unwrap_or(defaults.bind),
            port: env_parse("TOKENTIDE_PORT").unwrap_or(defaults.port),
            broadcast_capacity: env_parse("TOKENTIDE_BROADCAST_CAPACITY")
                .unwrap_or(defaults.broadcast_capacity),
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "unparsable value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(20));
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.fetch_timeout, Duration::from_millis(10_000));
        assert_eq!(config.port, 3001);
        assert_eq!(config.bind, "0.0.0.0");
    }

    #[test]
    fn env_parse_rejects_garbage() {
        // Variable names unique to this test to avoid cross-test races.
        std::env::set_var("TOKENTIDE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_parse::<u64>("TOKENTIDE_TEST_GARBAGE"), None);
        std::env::remove_var("TOKENTIDE_TEST_GARBAGE");

        assert_eq!(env_parse::<u64>("TOKENTIDE_TEST_UNSET"), None);
    }

    #[test]
    fn env_parse_reads_numbers_with_whitespace() {
        std::env::set_var("TOKENTIDE_TEST_NUMBER", " 42 ");
        assert_eq!(env_parse::<u64>("TOKENTIDE_TEST_NUMBER"), Some(42));
        std::env::remove_var("TOKENTIDE_TEST_NUMBER");
    }
}
