//! Yahoo Finance price source.
//!
//! Fetches daily closes from Yahoo's v8 chart API. Yahoo Finance has no
//! official API and is subject to unannounced format changes, so parsing is
//! strict about structure and lenient about individual null entries.
//!
//! No retry or backoff happens here: a failed request is reported once and the
//! caller decides what to do with the asset.

use super::provider::{DataError, PriceObservation, PriceSource};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance price source backed by a blocking HTTP client.
pub struct YahooSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooSource {
    /// Build a source whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: CHART_BASE_URL.to_string(),
        })
    }

    /// Build the chart API URL for a symbol from `start` up to now.
    fn chart_url(&self, symbol: &str, start: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = Utc::now().timestamp();
        format!(
            "{}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d&events=history",
            self.base_url
        )
    }

    /// Parse the chart API response into observations sorted by date.
    ///
    /// Bars without a close are dropped. When Yahoo repeats a date (the live
    /// bar of the current session often appears twice) the last value wins.
    fn parse_response(
        symbol: &str,
        resp: ChartResponse,
    ) -> Result<Vec<PriceObservation>, DataError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (_, Some(err)) if err.code == "Not Found" => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            (_, Some(err)) => {
                return Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (Some(result), None) => result,
            (None, None) => {
                return Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let Some(data) = result.into_iter().next() else {
            return Ok(Vec::new());
        };

        // A valid symbol with nothing in range comes back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?
            .close;

        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let mut by_date = BTreeMap::new();
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(close) = closes.get(i).copied().flatten() else {
                continue;
            };
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;
            by_date.insert(date, close);
        }

        Ok(by_date
            .into_iter()
            .map(|(date, close)| PriceObservation { date, close })
            .collect())
    }
}

impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceObservation>, DataError> {
        // Yahoo rejects period1 > period2 with a 400; nothing can exist yet anyway.
        if start > Utc::now().date_naive() {
            return Ok(Vec::new());
        }

        let url = self.chart_url(symbol, start);
        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                DataError::NetworkUnreachable(format!("timed out fetching {symbol}: {e}"))
            } else {
                DataError::NetworkUnreachable(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::Http {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let observations = Self::parse_response(symbol, chart)?;
        // Yahoo occasionally returns the last bar before period1; keep the contract.
        Ok(observations.into_iter().filter(|o| o.date >= start).collect())
    }
}
