//! Sync boundary planning: which date to ask the price source to start from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How much history a run re-requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Re-fetch everything from the epoch, overwriting stored rows.
    Full,
    /// Fetch only the days after each asset's latest stored date.
    #[default]
    Incremental,
}

/// The backfill epoch used when nothing else is configured: 2015-01-01.
pub fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Computes the inclusive start date of a fetch. Pure and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPlanner {
    epoch: NaiveDate,
}

impl BoundaryPlanner {
    pub fn new(epoch: NaiveDate) -> Self {
        Self { epoch }
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    /// `Full` and first-time `Incremental` start at the epoch; otherwise the
    /// day after `last_known`. No upper bound is planned.
    pub fn plan(&self, mode: SyncMode, last_known: Option<NaiveDate>) -> NaiveDate {
        match (mode, last_known) {
            (SyncMode::Full, _) | (SyncMode::Incremental, None) => self.epoch,
            (SyncMode::Incremental, Some(last)) => last.succ_opt().unwrap_or(last),
        }
    }
}

impl Default for BoundaryPlanner {
    fn default() -> Self {
        Self::new(default_epoch())
    }
}
