//! REST client for the historical candle endpoint

use super::types::{HistoryError, HistoryRequest};
use super::HistoryProvider;
use crate::bar::Bar;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Configuration for the history client
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Base URL for the historical data service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional bearer token
    pub access_token: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(10),
            access_token: None,
        }
    }
}

/// Candle response envelope: `{"data":{"candles":[[ts,o,h,l,c,v],...]}}`
#[derive(Debug, Deserialize)]
struct CandleResponse {
    data: CandleData,
}

#[derive(Debug, Deserialize)]
struct CandleData {
    candles: Vec<CandleRow>,
}

/// One candle row; the wire format is a heterogeneous JSON array
#[derive(Debug, Deserialize)]
struct CandleRow(String, f64, f64, f64, f64, Option<u64>);

/// Client for the historical candle endpoint
pub struct HistoryClient {
    config: HistoryConfig,
    client: Client,
}

impl HistoryClient {
    /// Create a new client with the given configuration
    pub fn new(config: HistoryConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Parse a candle timestamp
    ///
    /// The backend emits local time with a compact offset
    /// ("2026-08-24T09:15:00+0530"); RFC 3339 with a colon is accepted too.
    fn parse_ts(raw: &str) -> Result<DateTime<Utc>, HistoryError> {
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| HistoryError::MalformedRow(format!("bad timestamp {raw:?}")))
    }

    fn convert_row(row: CandleRow) -> Result<Bar, HistoryError> {
        let CandleRow(ts, open, high, low, close, volume) = row;
        let price = |v: f64| {
            Decimal::from_f64_retain(v)
                .ok_or_else(|| HistoryError::MalformedRow(format!("bad price {v}")))
        };
        Ok(Bar {
            ts: Self::parse_ts(&ts)?,
            open: price(open)?,
            high: price(high)?,
            low: price(low)?,
            close: price(close)?,
            volume,
        })
    }
}

#[async_trait]
impl HistoryProvider for HistoryClient {
    async fn fetch_bars(&self, request: &HistoryRequest) -> anyhow::Result<Vec<Bar>> {
        let url = format!(
            "{}/instruments/historical/{}/{}",
            self.config.base_url, request.symbol, request.interval
        );

        tracing::debug!(
            url = %url,
            from = %request.from,
            to = %request.to,
            "Fetching historical candles"
        );

        let mut req = self
            .client
            .get(&url)
            .query(&[("from", &request.from), ("to", &request.to)]);
        if let Some(token) = &self.config.access_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HistoryError::Status { status, body }.into());
        }

        let payload: CandleResponse = response.json().await?;
        let bars = payload
            .data
            .candles
            .into_iter()
            .map(Self::convert_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(symbol = %request.symbol, count = bars.len(), "Historical fetch complete");
        Ok(bars)
    }
}
