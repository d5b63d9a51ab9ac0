//! # Ledger Configuration
//!
//! YAML configuration for the ledger. Every key is optional:
//!
//! ```yaml
//! stamps_per_reward: 10
//! code_collision_limit: 100
//! near_threshold_window: 3
//! store_path: stampbook.json
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stampbook_core::RewardPolicy;

use crate::code::{CodeGenerator, DEFAULT_COLLISION_LIMIT};
use crate::engine::{Ledger, DEFAULT_NEAR_THRESHOLD_WINDOW};
use crate::error::ConfigError;

/// Default location of the customer collection.
pub const DEFAULT_STORE_PATH: &str = "stampbook.json";

/// Ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Stamps required for one reward.
    pub stamps_per_reward: u32,
    /// Suffixed candidates tried after a code collision.
    pub code_collision_limit: u32,
    /// Upper bound of the "a few stamps left" notice.
    pub near_threshold_window: u32,
    /// JSON file holding the customer collection.
    pub store_path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            stamps_per_reward: RewardPolicy::DEFAULT_STAMPS_PER_REWARD,
            code_collision_limit: DEFAULT_COLLISION_LIMIT,
            near_threshold_window: DEFAULT_NEAR_THRESHOLD_WINDOW,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a YAML document. An empty document yields the
    /// defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(
            path = %path.display(),
            stamps_per_reward = config.stamps_per_reward,
            "loaded ledger config"
        );
        Ok(config)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stamps_per_reward == 0 {
            return Err(ConfigError::OutOfRange {
                key: "stamps_per_reward",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.code_collision_limit == 0 {
            return Err(ConfigError::OutOfRange {
                key: "code_collision_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.near_threshold_window == 0 {
            return Err(ConfigError::OutOfRange {
                key: "near_threshold_window",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The reward policy. A zero value (only reachable by skipping
    /// validation) is clamped to one.
    pub fn policy(&self) -> RewardPolicy {
        RewardPolicy::new(self.stamps_per_reward)
            .unwrap_or_else(|| RewardPolicy::clamped(i64::from(self.stamps_per_reward)))
    }

    /// A ledger engine for these settings.
    pub fn ledger(&self) -> Ledger {
        Ledger::new(self.policy()).with_near_threshold_window(self.near_threshold_window)
    }

    /// A code generator for these settings.
    pub fn code_generator(&self) -> CodeGenerator {
        CodeGenerator::new(self.code_collision_limit)
    }
}
