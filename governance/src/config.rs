//! Governance configuration with TOML file support.

use ballot_types::{BallotError, GovernanceParams, VotePolicy};
use ballot_utils::{LogFormat, LoggingError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] BallotError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Configuration for a governance engine.
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`]
/// or built programmatically (e.g. for tests). Every field has a default,
/// so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Length of the voting window in clock units.
    #[serde(default = "default_voting_period")]
    pub voting_period: u64,

    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,

    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,

    /// `"single_vote"` or `"top_up"`.
    #[serde(default)]
    pub vote_policy: VotePolicy,

    /// `"human"` or `"json"`.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_voting_period() -> u64 {
    GovernanceParams::DEFAULT_VOTING_PERIOD
}

fn default_max_title_len() -> usize {
    GovernanceParams::DEFAULT_MAX_TITLE_LEN
}

fn default_max_description_len() -> usize {
    GovernanceParams::DEFAULT_MAX_DESCRIPTION_LEN
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.params().validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The engine-facing subset of this configuration.
    pub fn params(&self) -> GovernanceParams {
        GovernanceParams {
            voting_period: self.voting_period,
            max_title_len: self.max_title_len,
            max_description_len: self.max_description_len,
            vote_policy: self.vote_policy,
        }
    }

    /// Install the global tracing subscriber described by this config.
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        ballot_utils::init_logging(self.log_format, &self.log_level)?;
        Ok(())
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            voting_period: default_voting_period(),
            max_title_len: default_max_title_len(),
            max_description_len: default_max_description_len(),
            vote_policy: VotePolicy::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
