//! pricesync core: keeps a SQLite table of daily closes and RSI values in
//! step with an external price source.
//!
//! - Price sources behind the `PriceSource` trait (Yahoo Finance in production)
//! - Ordered asset registry (internal id → external symbol)
//! - Wilder-smoothed RSI with null warmup and 0/0 handling
//! - Idempotent per-asset upsert, one transaction per asset
//! - Incremental / full boundary planning and the per-asset sync pipeline

pub mod config;
pub mod data;
pub mod indicators;
pub mod store;
pub mod sync;

pub use config::{ConfigError, SyncConfig};
