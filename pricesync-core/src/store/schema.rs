//! Idempotent DDL for the price table.
//!
//! `UNIQUE(symbol, date)` is what the reconciler's upsert relies on; the
//! secondary index serves the per-asset `MAX(date)` lookup.

use rusqlite::Connection;

pub const CREATE_PRICE_DATA_TABLE: &str = "
CREATE TABLE IF NOT EXISTS price_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL,
    date TEXT NOT NULL,
    close REAL NOT NULL,
    rsi REAL,
    UNIQUE(symbol, date)
);
CREATE INDEX IF NOT EXISTS idx_symbol_date ON price_data(symbol, date);
";

/// Create the price table and its index if they do not exist yet.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    tracing::debug!("Ensuring price_data schema");
    conn.execute_batch(CREATE_PRICE_DATA_TABLE)
}
