//! Relational persistence for closes and RSI values

pub mod price_store;
pub mod schema;

pub use price_store::{AssetStatus, PriceRecord, PriceStore, StoreError, StoredPriceRecord};
pub use schema::init_schema;
