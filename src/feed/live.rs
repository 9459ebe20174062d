//! Tick stream state machine and WebSocket driver

use super::types::{QuoteTick, StreamState};
use crate::bar::Bar;
use crate::config::FeedConfig;
use crate::telemetry;
use crate::ws::{WsClient, WsConfig, WsMessage};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Maximum retained live bars: one full session at the 1 s throttle rate,
/// with margin
pub const MAX_LIVE_BARS: usize = 30_000;

/// At most one synthesized bar is emitted per rolling window of this length
pub const THROTTLE_WINDOW_MS: i64 = 1_000;

/// Inbound quote event, `{"type":"ticks","received_at":...,"ticks":[...]}`
///
/// Only the first tick record's `last_price` is consumed; multi-symbol
/// fan-out is not needed here.
#[derive(Debug, Deserialize)]
struct QuoteMessage {
    #[serde(rename = "type")]
    kind: String,
    /// Server receipt time, epoch milliseconds
    received_at: Option<i64>,
    #[serde(default)]
    ticks: Vec<TickRecord>,
}

#[derive(Debug, Deserialize)]
struct TickRecord {
    last_price: f64,
}

/// Live tick stream state machine
///
/// Owns all mutable stream state: connection state, throttle marker, and the
/// bounded live-bar buffer. Driven by a single [`handle_message`] entry
/// point; the buffer is republished on every accepted sample, not on every
/// raw message.
///
/// [`handle_message`]: TickStream::handle_message
pub struct TickStream {
    symbol: String,
    state: StreamState,
    last_accepted: Option<DateTime<Utc>>,
    buffer: VecDeque<Bar>,
    tx: Arc<watch::Sender<Vec<Bar>>>,
}

impl TickStream {
    /// Create a stream for one symbol, returning the buffer subscription
    pub fn new(symbol: impl Into<String>) -> (Self, watch::Receiver<Vec<Bar>>) {
        let (tx, rx) = watch::channel(Vec::new());
        (
            Self {
                symbol: symbol.into(),
                state: StreamState::Disconnected,
                last_accepted: None,
                buffer: VecDeque::new(),
                tx: Arc::new(tx),
            },
            rx,
        )
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current buffer contents, oldest first
    pub fn buffer(&self) -> Vec<Bar> {
        self.buffer.iter().cloned().collect()
    }

    /// Mark the transport as opening
    pub fn begin_connect(&mut self) {
        self.state = StreamState::Connecting;
    }

    /// Handle one transport event; `now` is the client wall clock
    pub fn handle_message(&mut self, msg: WsMessage, now: DateTime<Utc>) {
        match msg {
            WsMessage::Text(text) => {
                let Some(tick) = Self::parse_message(&text, now) else {
                    // Expected noise on a shared feed; drop without counting
                    // it as an error.
                    return;
                };
                // First parsed message is the implicit "connected" signal.
                self.state = StreamState::Streaming;
                self.accept(tick);
            }
            WsMessage::Connected => {
                tracing::debug!(symbol = %self.symbol, "Quote feed transport open");
            }
            WsMessage::Disconnected => {
                // Degrade to stale display: the buffer is kept so the chart
                // retains the last good picture until re-enable.
                tracing::warn!(symbol = %self.symbol, "Quote feed disconnected");
                self.state = StreamState::Disconnected;
            }
            WsMessage::Binary(_) => {
                // The quote feed is JSON text only.
            }
        }
    }

    /// Tear down: forget the buffer and publish it empty
    ///
    /// Used on disable, symbol change, and owner teardown. Distinct from a
    /// transport dropout, which keeps the buffer.
    pub fn shutdown(&mut self) {
        self.state = StreamState::Disconnected;
        self.buffer.clear();
        self.last_accepted = None;
        let _ = self.tx.send(Vec::new());
    }

    /// Parse a raw frame into a quote tick
    ///
    /// Returns `None` for frames that fail to parse, carry the wrong type
    /// tag, have no tick records, or whose price is not finite.
    fn parse_message(text: &str, now: DateTime<Utc>) -> Option<QuoteTick> {
        let msg: QuoteMessage = serde_json::from_str(text).ok()?;

        if msg.kind != "ticks" {
            return None;
        }

        let record = msg.ticks.first()?;
        if !record.last_price.is_finite() {
            return None;
        }
        let price = Decimal::from_f64_retain(record.last_price)?;

        let ts = msg
            .received_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or(now);

        Some(QuoteTick { price, ts })
    }

    /// Apply the 1 s sampling policy and append on acceptance
    fn accept(&mut self, tick: QuoteTick) {
        if let Some(last) = self.last_accepted {
            if (tick.ts - last) < Duration::milliseconds(THROTTLE_WINDOW_MS) {
                // Sampling, not backpressure: the consumer only needs the
                // latest price, so excess ticks are discarded outright.
                metrics::counter!(telemetry::TICKS_DROPPED).increment(1);
                return;
            }
        }
        self.last_accepted = Some(tick.ts);

        self.buffer.push_back(Bar::from_tick(tick.ts, tick.price));
        while self.buffer.len() > MAX_LIVE_BARS {
            self.buffer.pop_front();
        }

        metrics::counter!(telemetry::TICKS_ACCEPTED).increment(1);
        let _ = self.tx.send(self.buffer.iter().cloned().collect());
    }
}

/// Handle for tearing down a running live feed
pub struct FeedHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl FeedHandle {
    /// Request teardown: close the transport and clear the buffer
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.try_send(());
    }
}

/// WebSocket-backed live feed for one symbol
pub struct LiveFeed {
    config: FeedConfig,
}

impl LiveFeed {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    /// Build the subscribe payload sent when the connection opens
    fn subscribe_payload(&self) -> String {
        serde_json::json!({
            "symbols": [self.config.symbol],
            "mode": self.config.mode,
        })
        .to_string()
    }

    /// Open the subscription and return the live-bar buffer channel
    ///
    /// Spawns the driver task. Transport failures are logged and swallowed;
    /// the buffer simply stops updating until the caller re-subscribes.
    pub fn subscribe(&self) -> (watch::Receiver<Vec<Bar>>, FeedHandle) {
        let (mut stream, bars_rx) = TickStream::new(self.config.symbol.as_str());
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        tracing::info!(symbol = %self.config.symbol, "Subscribing to quote feed");

        let ws_config = WsConfig::new(self.config.ws_url.as_str())
            .subscribe_payload(self.subscribe_payload());
        let mut ws_rx = WsClient::new(ws_config).connect();

        stream.begin_connect();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    msg = ws_rx.recv() => {
                        match msg {
                            Some(msg) => {
                                let ended = matches!(msg, WsMessage::Disconnected);
                                stream.handle_message(msg, Utc::now());
                                if ended {
                                    break;
                                }
                            }
                            None => break,
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        stream.shutdown();
                        break;
                    }
                }
            }
            tracing::debug!(symbol = %stream.symbol(), "Live feed task finished");
        });

        (bars_rx, FeedHandle { shutdown_tx })
    }
}
