//! Sync orchestrator: walks the registry and brings each asset up to date.
//!
//! Each asset is an independent task: read cursor → plan → fetch → RSI →
//! reconcile. A task yields either a row count or an error; the run folds those
//! results into a [`SyncSummary`]. A failed asset never stops the assets after
//! it, and nothing is retried.

use super::planner::{BoundaryPlanner, SyncMode};
use crate::data::{AssetEntry, AssetRegistry, DataError, PriceObservation, PriceSource};
use crate::indicators::Rsi;
use crate::store::{PriceRecord, PriceStore, StoreError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stored closes loaded per RSI period when seeding from history.
const HISTORY_SEED_FACTOR: usize = 10;

/// Why a single asset failed to sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataError),

    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
}

/// Where an incremental run gets the RSI averaging window from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiContinuity {
    /// Seed the averages from the fetched slice alone. Values right after a
    /// sync boundary differ from a full recompute over the same dates.
    #[default]
    Reseed,
    /// Prepend recent stored closes before computing, so the recursion runs
    /// through the boundary. Only the fetched rows are written.
    StoredHistory,
}

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mode: SyncMode,
    pub planner: BoundaryPlanner,
    pub rsi: Rsi,
    pub continuity: RsiContinuity,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            planner: BoundaryPlanner::default(),
            rsi: Rsi::default(),
            continuity: RsiContinuity::default(),
        }
    }
}

/// Result of syncing one asset.
#[derive(Debug)]
pub struct AssetReport {
    pub asset_id: String,
    pub result: Result<AssetSync, SyncError>,
}

/// A successful per-asset sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSync {
    pub start: NaiveDate,
    pub rows: usize,
}

/// Aggregate over a whole run.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub reports: Vec<AssetReport>,
    pub total_rows: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl SyncSummary {
    fn record(mut self, report: AssetReport) -> Self {
        match &report.result {
            Ok(sync) => {
                self.succeeded += 1;
                self.total_rows += sync.rows;
            }
            Err(e) => {
                tracing::error!(asset = %report.asset_id, error = %e, "Error syncing asset");
                self.failed += 1;
            }
        }
        self.reports.push(report);
        self
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &SyncError)> {
        self.reports
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (r.asset_id.as_str(), e)))
    }
}

/// Sync every registered asset in registry order.
pub fn sync_assets(
    source: &dyn PriceSource,
    store: &mut PriceStore,
    registry: &AssetRegistry,
    options: &SyncOptions,
) -> SyncSummary {
    tracing::info!(
        source = source.name(),
        mode = ?options.mode,
        assets = registry.len(),
        "Starting sync"
    );

    let summary = registry
        .iter()
        .map(|asset| AssetReport {
            asset_id: asset.id.clone(),
            result: sync_asset(source, store, asset, options),
        })
        .fold(SyncSummary::default(), SyncSummary::record);

    tracing::info!(
        total_rows = summary.total_rows,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Sync complete"
    );
    summary
}

/// Sync a single asset: cursor → plan → fetch → RSI → reconcile.
pub fn sync_asset(
    source: &dyn PriceSource,
    store: &mut PriceStore,
    asset: &AssetEntry,
    options: &SyncOptions,
) -> Result<AssetSync, SyncError> {
    let last_known = store.last_date(&asset.id)?;
    let start = options.planner.plan(options.mode, last_known);
    tracing::debug!(asset = %asset.id, ?last_known, %start, "Planned fetch boundary");

    tracing::info!(asset = %asset.id, symbol = %asset.symbol, %start, "Fetching");
    let observations = source.fetch(&asset.symbol, start)?;

    if observations.is_empty() {
        tracing::info!(asset = %asset.id, "No new data");
        return Ok(AssetSync { start, rows: 0 });
    }

    let records = build_records(store, &asset.id, &observations, options)?;
    let rows = store.reconcile(&asset.id, &records)?;
    tracing::info!(asset = %asset.id, rows, "Stored records");

    Ok(AssetSync { start, rows })
}

/// Attach RSI values to fetched observations.
fn build_records(
    store: &PriceStore,
    asset_id: &str,
    observations: &[PriceObservation],
    options: &SyncOptions,
) -> Result<Vec<PriceRecord>, StoreError> {
    let seed = match (options.continuity, observations.first()) {
        (RsiContinuity::StoredHistory, Some(first)) => store.closes_before(
            asset_id,
            first.date,
            options.rsi.period() * HISTORY_SEED_FACTOR,
        )?,
        _ => Vec::new(),
    };

    let closes: Vec<f64> = seed
        .iter()
        .map(|(_, close)| *close)
        .chain(observations.iter().map(|o| o.close))
        .collect();

    let samples = options.rsi.samples(&closes);

    Ok(observations
        .iter()
        .zip(&samples[seed.len()..])
        .map(|(obs, rsi)| PriceRecord {
            date: obs.date,
            close: obs.close,
            rsi: *rsi,
        })
        .collect())
}
