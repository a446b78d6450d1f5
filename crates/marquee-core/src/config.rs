//! Runtime configuration, loaded from TOML.
//!
//! Every section and key is optional; missing keys take the defaults below
//! and unknown keys are rejected.

use crate::db::tx::SideEffectPolicy;
use serde::{Deserialize, Serialize};
use std::{io, path::Path, time::Duration};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// MarqueeConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarqueeConfig {
    pub pool: PoolConfig,
    pub pagination: PaginationConfig,
    pub transaction: TransactionConfig,
}

impl MarqueeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.pool.max_connections == 0 {
            return invalid("pool.max_connections must be at least 1");
        }
        if self.pool.acquire_timeout_ms == 0 {
            return invalid("pool.acquire_timeout_ms must be at least 1");
        }
        if self.pagination.default_take == 0 {
            return invalid("pagination.default_take must be at least 1");
        }
        if self.pagination.default_take > self.pagination.max_take {
            return invalid("pagination.default_take must not exceed pagination.max_take");
        }
        if self.pagination.default_order.is_empty() {
            return invalid("pagination.default_order must name at least one column");
        }
        if self.transaction.sweep_interval_ms == 0 {
            return invalid("transaction.sweep_interval_ms must be at least 1");
        }

        Ok(())
    }
}

///
/// PoolConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    pub max_connections: usize,
    pub acquire_timeout_ms: u64,
}

impl PoolConfig {
    #[must_use]
    pub const fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_ms: 5_000,
        }
    }
}

///
/// PaginationConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    pub default_take: u32,
    pub max_take: u32,
    pub default_order: Vec<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_take: 5,
            max_take: 100,
            default_order: vec!["id_DESC".to_string()],
        }
    }
}

///
/// TransactionConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransactionConfig {
    /// Policy used by `TransactionHandle::side_effect`.
    pub side_effects: SideEffectPolicy,
    pub sweep_interval_ms: u64,
}

impl TransactionConfig {
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            side_effects: SideEffectPolicy::AfterCommit,
            sweep_interval_ms: 30_000,
        }
    }
}

///
/// TESTS
///
