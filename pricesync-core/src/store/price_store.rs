//! SQLite-backed price store.
//!
//! Dates are stored as ISO-8601 `YYYY-MM-DD` text, which sorts the same way
//! the dates do, so `MAX(date)` and `ORDER BY date` need no conversion.

use super::schema;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid stored date '{value}': {source}")]
    InvalidDate {
        value: String,
        source: chrono::ParseError,
    },
}

/// One row handed to the reconciler: a fetched close and its indicator value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
}

/// A persisted row, including its surrogate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPriceRecord {
    pub id: i64,
    pub asset_id: String,
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
}

/// Row count and date range stored for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStatus {
    pub asset_id: String,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

pub struct PriceStore {
    conn: Connection,
}

impl PriceStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// The sync cursor: latest stored date for an asset, read fresh every call.
    pub fn last_date(&self, asset_id: &str) -> Result<Option<NaiveDate>, StoreError> {
        let raw: Option<String> = self.conn.query_row(
            "SELECT MAX(date) FROM price_data WHERE symbol = ?1",
            [asset_id],
            |row| row.get(0),
        )?;
        raw.as_deref().map(parse_date).transpose()
    }

    /// Insert-or-overwrite a batch for one asset inside a single transaction.
    ///
    /// Existing `(asset, date)` keys get `close` and `rsi` replaced
    /// unconditionally. Returns the batch length, not the number of rows whose
    /// values changed. Any failure rolls the whole batch back.
    pub fn reconcile(&mut self, asset_id: &str, rows: &[PriceRecord]) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut stmt = tx.prepare(
            "INSERT INTO price_data (symbol, date, close, rsi)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(symbol, date) DO UPDATE SET
               close = excluded.close,
               rsi = excluded.rsi",
        )?;

        for row in rows {
            stmt.execute(params![
                asset_id,
                row.date.format(DATE_FORMAT).to_string(),
                row.close,
                row.rsi,
            ])?;
        }

        drop(stmt);
        tx.commit()?;

        Ok(rows.len())
    }

    /// All stored rows for an asset, oldest first.
    pub fn history(&self, asset_id: &str) -> Result<Vec<StoredPriceRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, symbol, date, close, rsi FROM price_data
             WHERE symbol = ?1 ORDER BY date ASC",
        )?;

        let rows = stmt
            .query_map([asset_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, asset_id, date, close, rsi)| {
                Ok(StoredPriceRecord {
                    id,
                    asset_id,
                    date: parse_date(&date)?,
                    close,
                    rsi,
                })
            })
            .collect()
    }

    /// Up to `limit` most recent closes strictly before `before`, oldest first.
    pub fn closes_before(
        &self,
        asset_id: &str,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<(NaiveDate, f64)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, close FROM price_data
             WHERE symbol = ?1 AND date < ?2
             ORDER BY date DESC LIMIT ?3",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(
                params![asset_id, before.format(DATE_FORMAT).to_string(), limit],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut closes = rows
            .into_iter()
            .map(|(date, close)| Ok((parse_date(&date)?, close)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        closes.reverse();
        Ok(closes)
    }

    /// Per-asset row counts and date ranges, ordered by asset id.
    pub fn status(&self) -> Result<Vec<AssetStatus>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, COUNT(*), MIN(date), MAX(date) FROM price_data
             GROUP BY symbol ORDER BY symbol ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(asset_id, count, first, last)| {
                Ok(AssetStatus {
                    asset_id,
                    rows: usize::try_from(count).unwrap_or(0),
                    first_date: parse_date(&first)?,
                    last_date: parse_date(&last)?,
                })
            })
            .collect()
    }

    /// Number of stored rows for one `(asset, date)` key.
    pub fn count_key(&self, asset_id: &str, date: NaiveDate) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM price_data WHERE symbol = ?1 AND date = ?2",
            params![asset_id, date.format(DATE_FORMAT).to_string()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| StoreError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(day: u32, close: f64, rsi: Option<f64>) -> PriceRecord {
        PriceRecord {
            date: date(2024, 1, day),
            close,
            rsi,
        }
    }

    #[test]
    fn empty_store_has_no_cursor() {
        let store = PriceStore::open_in_memory().unwrap();
        assert_eq!(store.last_date("BTC").unwrap(), None);
    }

    #[test]
    fn insert_then_overwrite_keeps_one_row() {
        let mut store = PriceStore::open_in_memory().unwrap();

        let n = store
            .reconcile("BTC", &[record(1, 42000.0, Some(55.2))])
            .unwrap();
        assert_eq!(n, 1);

        let n = store.reconcile("BTC", &[record(1, 42500.0, None)]).unwrap();
        assert_eq!(n, 1);

        let rows = store.history("BTC").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 42500.0);
        assert_eq!(rows[0].rsi, None);
        assert_eq!(store.count_key("BTC", date(2024, 1, 1)).unwrap(), 1);
    }

    #[test]
    fn overwrite_keeps_surrogate_id() {
        let mut store = PriceStore::open_in_memory().unwrap();
        store.reconcile("ETH", &[record(2, 1.0, None)]).unwrap();
        let before = store.history("ETH").unwrap()[0].id;
        store.reconcile("ETH", &[record(2, 2.0, Some(40.0))]).unwrap();
        assert_eq!(store.history("ETH").unwrap()[0].id, before);
    }

    #[test]
    fn empty_batch_is_noop() {
        let mut store = PriceStore::open_in_memory().unwrap();
        assert_eq!(store.reconcile("BTC", &[]).unwrap(), 0);
        assert!(store.history("BTC").unwrap().is_empty());
    }

    #[test]
    fn identical_overwrite_still_counts() {
        let mut store = PriceStore::open_in_memory().unwrap();
        let batch = [record(1, 1.0, None), record(2, 2.0, None)];
        assert_eq!(store.reconcile("BTC", &batch).unwrap(), 2);
        assert_eq!(store.reconcile("BTC", &batch).unwrap(), 2);
        assert_eq!(store.history("BTC").unwrap().len(), 2);
    }

    #[test]
    fn failed_batch_rolls_back() {
        let mut store = PriceStore::open_in_memory().unwrap();
        store.reconcile("BTC", &[record(1, 1.0, None)]).unwrap();

        // NaN binds as NULL and violates `close NOT NULL` on the second row.
        let batch = [record(1, 9.0, Some(10.0)), record(2, f64::NAN, None)];
        assert!(store.reconcile("BTC", &batch).is_err());

        let rows = store.history("BTC").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 1.0);
        assert_eq!(rows[0].rsi, None);
    }

    #[test]
    fn cursor_is_per_asset_max_date() {
        let mut store = PriceStore::open_in_memory().unwrap();
        store
            .reconcile("BTC", &[record(3, 1.0, None), record(9, 1.0, None)])
            .unwrap();
        store.reconcile("ETH", &[record(20, 1.0, None)]).unwrap();

        assert_eq!(store.last_date("BTC").unwrap(), Some(date(2024, 1, 9)));
        assert_eq!(store.last_date("ETH").unwrap(), Some(date(2024, 1, 20)));
    }

    #[test]
    fn closes_before_returns_trailing_window_oldest_first() {
        let mut store = PriceStore::open_in_memory().unwrap();
        let batch: Vec<PriceRecord> = (1..=10).map(|d| record(d, d as f64, None)).collect();
        store.reconcile("BTC", &batch).unwrap();

        let closes = store.closes_before("BTC", date(2024, 1, 8), 3).unwrap();
        assert_eq!(
            closes,
            vec![
                (date(2024, 1, 5), 5.0),
                (date(2024, 1, 6), 6.0),
                (date(2024, 1, 7), 7.0),
            ]
        );
    }

    #[test]
    fn status_groups_by_asset() {
        let mut store = PriceStore::open_in_memory().unwrap();
        store
            .reconcile("ETH", &[record(5, 1.0, None), record(6, 1.0, None)])
            .unwrap();
        store.reconcile("BTC", &[record(1, 1.0, None)]).unwrap();

        let status = store.status().unwrap();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].asset_id, "BTC");
        assert_eq!(status[1].rows, 2);
        assert_eq!(status[1].first_date, date(2024, 1, 5));
        assert_eq!(status[1].last_date, date(2024, 1, 6));
    }

    #[test]
    fn file_backed_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        {
            let mut store = PriceStore::open(&path).unwrap();
            store.reconcile("GLD", &[record(4, 180.0, None)]).unwrap();
        }

        let store = PriceStore::open(&path).unwrap();
        assert_eq!(store.last_date("GLD").unwrap(), Some(date(2024, 1, 4)));
    }
}
