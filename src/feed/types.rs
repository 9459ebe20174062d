//! Live feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A single accepted quote from the live feed
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTick {
    /// Last traded price
    pub price: Decimal,
    /// Server receipt time if the message carried one, else client wall clock
    pub ts: DateTime<Utc>,
}

/// Live stream connection state
///
/// `Connecting -> Streaming` is implicit on the first successfully parsed
/// message; the feed requires no explicit connected acknowledgment before
/// accepting data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Streaming,
}
