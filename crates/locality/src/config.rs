//! Locality configuration.
//!
//! Only two knobs exist: whether `node` tiers are compared by resolved
//! address, and how long a single host lookup may take.
//!
//! Environment variables:
//! - LOCALITY_COMPARE_NODE_IP: "true"/"false" (also "1"/"0"), default false
//! - LOCALITY_RESOLVE_TIMEOUT_MS: lookup timeout in milliseconds, default 1000

use std::num::ParseIntError;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::CompareMode;
use crate::error::ConfigError;

pub const COMPARE_NODE_IP_ENV: &str = "LOCALITY_COMPARE_NODE_IP";
pub const RESOLVE_TIMEOUT_ENV: &str = "LOCALITY_RESOLVE_TIMEOUT_MS";

const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalityConfig {
    /// Compare `node` tier values by resolved network address.
    pub compare_node_ip: bool,
    pub resolve_timeout_ms: u64,
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            compare_node_ip: false,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
        }
    }
}

impl LocalityConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!(
            compare_node_ip = config.compare_node_ip,
            resolve_timeout_ms = config.resolve_timeout_ms,
            "loaded locality config"
        );
        Ok(config)
    }

    /// Load configuration from an arbitrary key lookup. Missing keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(COMPARE_NODE_IP_ENV) {
            config.compare_node_ip = parse_bool(COMPARE_NODE_IP_ENV, &raw)?;
        }
        if let Some(raw) = lookup(RESOLVE_TIMEOUT_ENV) {
            config.resolve_timeout_ms = raw.trim().parse().map_err(|err: ParseIntError| {
                ConfigError::InvalidValue {
                    key: RESOLVE_TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                    reason: err.to_string(),
                }
            })?;
        }
        Ok(config)
    }

    pub fn compare_mode(&self) -> CompareMode {
        CompareMode::from_flag(self.compare_node_ip)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
