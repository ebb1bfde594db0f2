//! Price sources and the asset registry

pub mod provider;
pub mod registry;
pub mod yahoo;

pub use provider::{DataError, PriceObservation, PriceSource};
pub use registry::{AssetEntry, AssetRegistry};
pub use yahoo::YahooSource;
