//! Asset registry: the ordered mapping from internal asset id to the
//! external symbol the price source understands.
//!
//! The registry is configuration data: it is built once at startup (from the
//! built-in default or a TOML file) and only read afterwards. Iteration order
//! is declaration order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One registered asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Internal id, also the `symbol` column in storage (e.g. "BTC").
    pub id: String,
    /// Symbol passed to the price source (e.g. "BTC-USD").
    pub symbol: String,
}

impl AssetEntry {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
        }
    }
}

/// Immutable, ordered asset registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistry {
    assets: Vec<AssetEntry>,
}

impl AssetRegistry {
    /// Build a registry, rejecting empty fields and duplicate ids.
    pub fn new(assets: Vec<AssetEntry>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for asset in &assets {
            if asset.id.trim().is_empty() {
                return Err("asset id must not be empty".into());
            }
            if asset.symbol.trim().is_empty() {
                return Err(format!("asset '{}' has an empty symbol", asset.id));
            }
            if !seen.insert(asset.id.as_str()) {
                return Err(format!("duplicate asset id '{}'", asset.id));
            }
        }
        Ok(Self { assets })
    }

    /// Iterate entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.assets.iter()
    }

    /// Look up an asset by its internal id (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&AssetEntry> {
        self.assets.iter().find(|a| a.id.eq_ignore_ascii_case(id))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// The collector's default set: crypto, global and regional equity,
    /// bonds, commodities, REITs and thematic ETFs.
    pub fn default_assets() -> Self {
        let pairs = [
            // Crypto
            ("BTC", "BTC-USD"),
            ("ETH", "ETH-USD"),
            ("BNB", "BNB-USD"),
            ("SOL", "SOL-USD"),
            ("XRP", "XRP-USD"),
            ("LTC", "LTC-USD"),
            // Global equity
            ("VWRA", "VWRA.L"),
            ("IWDA", "IWDA.L"),
            ("VT", "VT"),
            // Regional equity
            ("CSPX", "CSPX.L"),
            ("VTI", "VTI"),
            ("EXSA", "EXSA.DE"),
            ("VWO", "VWO"),
            // Fixed income
            ("BND", "BND"),
            ("EMB", "EMB"),
            // Commodities
            ("GLD", "GLD"),
            ("DBC", "DBC"),
            // Real estate
            ("VNQ", "VNQ"),
            // Thematic & sector
            ("QQQ", "QQQ"),
            ("ICLN", "ICLN"),
            ("VHYL", "VHYL.L"),
        ];

        Self {
            assets: pairs
                .into_iter()
                .map(|(id, symbol)| AssetEntry::new(id, symbol))
                .collect(),
        }
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::default_assets()
    }
}
