//! Price source trait and structured error types.
//!
//! The PriceSource trait abstracts over where daily closes come from (Yahoo
//! Finance in production, scripted sources in tests) so the sync engine never
//! depends on a concrete HTTP client.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily close as reported by a price source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Structured error types for price-source operations.
///
/// These are displayable as-is in per-asset log lines.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    Http { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for daily price sources.
///
/// `fetch` returns observations ordered by date, from `start` (inclusive) up to
/// the latest available trading day. An empty vector is a normal answer when
/// nothing applies (e.g. `start` is after the last bar).
pub trait PriceSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch daily closes for an external symbol starting at `start`.
    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceObservation>, DataError>;
}
