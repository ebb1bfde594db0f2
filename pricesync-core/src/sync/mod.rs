//! Incremental synchronization: boundary planning and the per-asset pipeline

pub mod orchestrator;
pub mod planner;

pub use orchestrator::{
    sync_asset, sync_assets, AssetReport, AssetSync, RsiContinuity, SyncError, SyncOptions,
    SyncSummary,
};
pub use planner::{default_epoch, BoundaryPlanner, SyncMode};
