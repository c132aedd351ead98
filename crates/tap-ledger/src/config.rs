//! Operator configuration, loaded from TOML
//!
//! ```toml
//! owner = "0x6f776e6572000000000000000000000000000000"
//! snapshot = "ledger.json"
//!
//! [clock]
//! mode = "fixed"
//! date = "2026-10-18"
//! ```

use crate::clock::{Clock, FixedClock, SystemClock};
use crate::identity::Identity;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Owner recorded by `init` when no caller is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Identity>,
    /// Snapshot file holding the ledger state
    pub snapshot: PathBuf,
    /// Time source for date-bound policies
    pub clock: ClockConfig,
}

impl LedgerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With owner
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: Identity) -> Self {
        self.owner = Some(owner);
        self
    }

    /// With clock
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    /// With snapshot path
    #[inline]
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = path.into();
        self
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            owner: None,
            snapshot: PathBuf::from("tap-ledger.json"),
            clock: ClockConfig::System,
        }
    }
}

/// Clock selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ClockConfig {
    /// Wall clock
    #[default]
    System,
    /// Midnight UTC of a fixed date
    Fixed { date: NaiveDate },
}

impl Clock for ClockConfig {
    fn now(&self) -> DateTime<Utc> {
        match self {
            ClockConfig::System => SystemClock.now(),
            ClockConfig::Fixed { date } => FixedClock::at_date(*date).now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}
