//! intraday-sync: live-market-data synchronization for intraday charting
//!
//! This library keeps one symbol's price series both complete and current:
//! - Session window calculation for the exchange's trading day
//! - Periodic historical backfill from a REST candle endpoint
//! - Throttled live tick stream over WebSocket
//! - Chronological merge of historical and live bars for consumers
//! - Configuration, CLI, and observability plumbing

pub mod bar;
pub mod cli;
pub mod config;
pub mod feed;
pub mod history;
pub mod session;
pub mod sync;
pub mod telemetry;
pub mod ws;
