//! WebSocket transport
//!
//! Single-shot connection wrapper for the live quote feed. There is no
//! automatic reconnection: on transport failure the stream ends and the
//! periodic historical backfill remains the correctness backstop.

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsMessage};
