//! OHLCV bar type shared by the historical and live data paths

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLCV sample
///
/// Two provenances: historical bars come from the backend and may carry real
/// volume; live bars are synthesized from a single last-traded-price tick
/// (open = high = low = close, no volume).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Sample timestamp
    pub ts: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Traded volume; absent on live-synthesized bars
    pub volume: Option<u64>,
}

impl Bar {
    /// Synthesize a degenerate single-price bar from one live tick
    pub fn from_tick(ts: DateTime<Utc>, price: Decimal) -> Self {
        Self {
            ts,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_tick_degenerate_ohlc() {
        let ts = Utc::now();
        let bar = Bar::from_tick(ts, dec!(2500.5));
        assert_eq!(bar.open, dec!(2500.5));
        assert_eq!(bar.high, dec!(2500.5));
        assert_eq!(bar.low, dec!(2500.5));
        assert_eq!(bar.close, dec!(2500.5));
        assert_eq!(bar.ts, ts);
        assert!(bar.volume.is_none());
    }

    #[test]
    fn test_bar_serde_roundtrip() {
        let bar = Bar::from_tick(Utc::now(), dec!(101.25));
        let json = serde_json::to_string(&bar).unwrap();
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, back);
    }
}
