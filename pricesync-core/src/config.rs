//! Serializable sync configuration.
//!
//! Every field is optional in the TOML file; missing fields fall back to the
//! reference deployment (2015-01-01 epoch, 14-period RSI, re-seeded per run,
//! default asset list).

use crate::data::{AssetEntry, AssetRegistry};
use crate::indicators::Rsi;
use crate::sync::{default_epoch, BoundaryPlanner, RsiContinuity, SyncMode, SyncOptions};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Fixed backfill start.
    pub epoch: NaiveDate,

    /// RSI lookback; must be at least 1.
    pub rsi_period: usize,

    /// How incremental runs seed the RSI averages.
    pub rsi_continuity: RsiContinuity,

    /// HTTP timeout for a single price-source request.
    pub request_timeout_secs: u64,

    /// Asset list; the built-in registry is used when absent.
    pub assets: Option<Vec<AssetEntry>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
            rsi_period: Rsi::DEFAULT_PERIOD,
            rsi_continuity: RsiContinuity::default(),
            request_timeout_secs: 30,
            assets: None,
        }
    }
}

impl SyncConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rsi_period == 0 {
            return Err(ConfigError::Invalid("rsi_period must be >= 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be >= 1".into(),
            ));
        }
        self.registry().map(|_| ())
    }

    /// The registry to sync, in declaration order.
    pub fn registry(&self) -> Result<AssetRegistry, ConfigError> {
        match &self.assets {
            None => Ok(AssetRegistry::default_assets()),
            Some(assets) if assets.is_empty() => {
                Err(ConfigError::Invalid("assets list is empty".into()))
            }
            Some(assets) => AssetRegistry::new(assets.clone()).map_err(ConfigError::Invalid),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Options for a run in the given mode.
    pub fn sync_options(&self, mode: SyncMode) -> SyncOptions {
        SyncOptions {
            mode,
            planner: BoundaryPlanner::new(self.epoch),
            rsi: Rsi::new(self.rsi_period.max(1)),
            continuity: self.rsi_continuity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let config = SyncConfig::from_toml("").unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.registry().unwrap().len(), 21);
        assert_eq!(config.epoch, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
    }

    #[test]
    fn parses_all_fields() {
        let config = SyncConfig::from_toml(
            r#"
epoch = "2020-01-01"
rsi_period = 7
rsi_continuity = "stored_history"
request_timeout_secs = 5

[[assets]]
id = "BTC"
symbol = "BTC-USD"

[[assets]]
id = "GLD"
symbol = "GLD"
"#,
        )
        .unwrap();

        assert_eq!(config.rsi_period, 7);
        assert_eq!(config.rsi_continuity, RsiContinuity::StoredHistory);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));

        let registry = config.registry().unwrap();
        let ids: Vec<&str> = registry.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["BTC", "GLD"]);

        let options = config.sync_options(SyncMode::Full);
        assert_eq!(options.rsi.period(), 7);
        assert_eq!(
            options.planner.epoch(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
    }

    #[test]
    fn rejects_zero_period() {
        let err = SyncConfig::from_toml("rsi_period = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_assets() {
        let err = SyncConfig::from_toml(
            r#"
[[assets]]
id = "BTC"
symbol = "BTC-USD"

[[assets]]
id = "BTC"
symbol = "BTC-EUR"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            SyncConfig::from_toml("rsi_perod = 14"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SyncConfig::from_file(Path::new("/nonexistent/pricesync.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pricesync.toml"));
    }
}
