//! Configuration Module
//!
//! Loads cache, TTL and upstream settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Named data categories, each with its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtlCategory {
    /// Frequently changing aggregates (dashboards, monthly totals)
    Aggregates,
    /// Semi-static reference data (clusters, franchise lists)
    Reference,
    /// Rarely changing parameter tables
    Parameters,
    /// Anything without a more specific category
    Default,
}

impl FromStr for TtlCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aggregates" => Ok(TtlCategory::Aggregates),
            "reference" => Ok(TtlCategory::Reference),
            "parameters" => Ok(TtlCategory::Parameters),
            "default" => Ok(TtlCategory::Default),
            other => Err(format!("Unknown TTL category: {}", other)),
        }
    }
}

/// TTLs in milliseconds per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    pub default_ms: u64,
    pub aggregates_ms: u64,
    pub reference_ms: u64,
    pub parameters_ms: u64,
}

impl TtlPolicy {
    pub fn ttl_for(&self, category: TtlCategory) -> Duration {
        let ms = match category {
            TtlCategory::Aggregates => self.aggregates_ms,
            TtlCategory::Reference => self.reference_ms,
            TtlCategory::Parameters => self.parameters_ms,
            TtlCategory::Default => self.default_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            default_ms: 120_000,
            aggregates_ms: 30_000,
            reference_ms: 60_000,
            parameters_ms: 600_000,
        }
    }
}

/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTLs per data category
    pub ttl: TtlPolicy,
    /// Interval in seconds between expiry sweeps
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream values API; in-memory store when unset
    pub upstream_url: Option<String>,
    /// Bearer token sent to the upstream
    pub upstream_token: Option<String>,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - TTL when no category applies (default: 120000)
    /// - `TTL_AGGREGATES_MS` - aggregates TTL (default: 30000)
    /// - `TTL_REFERENCE_MS` - reference data TTL (default: 60000)
    /// - `TTL_PARAMETERS_MS` - parameter tables TTL (default: 600000)
    /// - `SWEEP_INTERVAL_SECS` - expiry sweep frequency (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - upstream values API base URL (optional)
    /// - `UPSTREAM_TOKEN` - upstream bearer token (optional)
    /// - `UPSTREAM_TIMEOUT_SECS` - upstream request timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            ttl: TtlPolicy {
                default_ms: env_or("DEFAULT_TTL_MS", defaults.ttl.default_ms),
                aggregates_ms: env_or("TTL_AGGREGATES_MS", defaults.ttl.aggregates_ms),
                reference_ms: env_or("TTL_REFERENCE_MS", defaults.ttl.reference_ms),
                parameters_ms: env_or("TTL_PARAMETERS_MS", defaults.ttl.parameters_ms),
            },
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL").ok().filter(|v| !v.is_empty()),
            upstream_token: env::var("UPSTREAM_TOKEN").ok().filter(|v| !v.is_empty()),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl: TtlPolicy::default(),
            sweep_interval: 300,
            server_port: 3000,
            upstream_url: None,
            upstream_token: None,
            upstream_timeout: 30,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ttl.default_ms, 120_000);
        assert_eq!(config.sweep_interval, 300);
        assert_eq!(config.server_port, 3000);
        assert!(config.upstream_url.is_none());
        assert_eq!(config.upstream_timeout, 30);
    }

    #[test]
    fn test_ttl_for_category() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.ttl_for(TtlCategory::Aggregates), Duration::from_secs(30));
        assert_eq!(policy.ttl_for(TtlCategory::Reference), Duration::from_secs(60));
        assert_eq!(policy.ttl_for(TtlCategory::Parameters), Duration::from_secs(600));
        assert_eq!(policy.ttl_for(TtlCategory::Default), policy.default_ttl());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("reference".parse::<TtlCategory>(), Ok(TtlCategory::Reference));
        assert!("weekly".parse::<TtlCategory>().is_err());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("SHEET_CACHE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("SHEET_CACHE_TEST_GARBAGE", 42u64), 42);

        env::set_var("SHEET_CACHE_TEST_NUMBER", "7");
        assert_eq!(env_or("SHEET_CACHE_TEST_NUMBER", 42u64), 7);

        env::remove_var("SHEET_CACHE_TEST_GARBAGE");
        env::remove_var("SHEET_CACHE_TEST_NUMBER");
    }
}
