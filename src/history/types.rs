//! Historical fetch request types

use thiserror::Error;

/// One historical candle request
///
/// `from`/`to` carry the plain (zone-suffix-free) stamp form; the candle
/// endpoint rejects zoned stamps. Callers targeting the zoned endpoint take
/// the stamps from the session window instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    /// Candle granularity, e.g. "minute"
    pub interval: String,
    pub from: String,
    pub to: String,
}

/// Historical fetch errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed candle row: {0}")]
    MalformedRow(String),
}
