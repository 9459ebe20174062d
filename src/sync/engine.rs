//! Sync engine: single-task event loop around the coordinator
//!
//! One task owns the coordinator, the live-buffer cache, and the merged
//! output channel; window updates, live samples, fetch completions, and
//! control commands are serialized through its `select!` loop, so no
//! coordinator state ever sees a concurrent writer.

use super::coordinator::Coordinator;
use super::types::FetchKey;
use crate::bar::Bar;
use crate::config::Config;
use crate::feed::{FeedHandle, LiveFeed};
use crate::history::{HistoryProvider, HistoryRequest};
use crate::session::SessionTicker;
use crate::telemetry;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Control commands accepted by a running engine
#[derive(Debug)]
pub enum Command {
    /// Switch the active symbol; clears live and historical state first
    SetSymbol(String),
    /// Enable or disable live mode
    SetLive(bool),
    /// Immediate historical resync, outside the cooldown schedule
    ForceRefetch,
    /// Stop the engine
    Shutdown,
}

/// Handle to a running [`SyncEngine`]
pub struct SyncHandle {
    merged_rx: watch::Receiver<Vec<Bar>>,
    control_tx: mpsc::Sender<Command>,
}

impl SyncHandle {
    /// Subscribe to the merged bar series
    pub fn merged(&self) -> watch::Receiver<Vec<Bar>> {
        self.merged_rx.clone()
    }

    pub async fn set_symbol(&self, symbol: impl Into<String>) {
        let _ = self.control_tx.send(Command::SetSymbol(symbol.into())).await;
    }

    pub async fn set_live(&self, enabled: bool) {
        let _ = self.control_tx.send(Command::SetLive(enabled)).await;
    }

    /// Force a historical resync now (e.g. user-initiated refresh)
    pub async fn force_refetch(&self) {
        let _ = self.control_tx.send(Command::ForceRefetch).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.control_tx.send(Command::Shutdown).await;
    }
}

/// Live feed attachment: the buffer subscription plus its teardown handle
struct FeedSlot {
    bars_rx: watch::Receiver<Vec<Bar>>,
    handle: Option<FeedHandle>,
    // Keeps the idle channel open when no feed is attached.
    _idle_tx: Option<watch::Sender<Vec<Bar>>>,
}

impl FeedSlot {
    fn idle() -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        Self {
            bars_rx: rx,
            handle: None,
            _idle_tx: Some(tx),
        }
    }

    fn attached(bars_rx: watch::Receiver<Vec<Bar>>, handle: FeedHandle) -> Self {
        Self {
            bars_rx,
            handle: Some(handle),
            _idle_tx: None,
        }
    }

    /// Tear down the transport and buffer, leaving an idle slot
    fn detach(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.shutdown();
        }
        *self = Self::idle();
    }
}

/// Backfill-and-merge engine for one symbol at a time
pub struct SyncEngine {
    config: Config,
    history: Arc<dyn HistoryProvider>,
}

impl SyncEngine {
    pub fn new(config: Config, history: Arc<dyn HistoryProvider>) -> Self {
        Self { config, history }
    }

    /// Start the engine task and return its handle
    pub fn spawn(self) -> SyncHandle {
        let (merged_tx, merged_rx) = watch::channel(Vec::new());
        let (control_tx, control_rx) = mpsc::channel(16);

        tokio::spawn(self.run(merged_tx, control_rx));

        SyncHandle {
            merged_rx,
            control_tx,
        }
    }

    fn attach_feed(&self, symbol: &str, live_enabled: bool) -> FeedSlot {
        if !live_enabled || symbol.trim().is_empty() {
            return FeedSlot::idle();
        }
        let mut feed_config = self.config.feed.clone();
        feed_config.symbol = symbol.to_string();
        let (bars_rx, handle) = LiveFeed::new(feed_config).subscribe();
        FeedSlot::attached(bars_rx, handle)
    }

    fn spawn_fetch(
        &self,
        key: FetchKey,
        request: HistoryRequest,
        results_tx: &mpsc::Sender<(FetchKey, Result<Vec<Bar>, String>)>,
    ) {
        let provider = Arc::clone(&self.history);
        let results_tx = results_tx.clone();
        tokio::spawn(async move {
            let result = provider
                .fetch_bars(&request)
                .await
                .map_err(|e| e.to_string());
            let _ = results_tx.send((key, result)).await;
        });
    }

    async fn run(
        self,
        merged_tx: watch::Sender<Vec<Bar>>,
        mut control_rx: mpsc::Receiver<Command>,
    ) {
        let live_enabled = self.config.feed.live_enabled;
        let mut coordinator = Coordinator::new(
            self.config.feed.symbol.clone(),
            live_enabled,
            self.config.history.interval.clone(),
            self.config.sync.cooldown_secs,
        );

        let mut ticker = SessionTicker::new(self.config.session.clone());
        let mut window_rx = ticker.subscribe();
        if live_enabled {
            ticker.enable();
        }

        let mut feed = self.attach_feed(&self.config.feed.symbol, live_enabled);
        // Last known live buffer; survives a feed dropout so the display
        // degrades to stale rather than blanking.
        let mut live_bars: Vec<Bar> = Vec::new();

        let (results_tx, mut results_rx) =
            mpsc::channel::<(FetchKey, Result<Vec<Bar>, String>)>(16);

        let publish = |coordinator: &Coordinator, live_bars: &[Bar], tx: &watch::Sender<Vec<Bar>>| {
            let merged = coordinator.merged(live_bars);
            metrics::gauge!(telemetry::MERGED_LEN).set(merged.len() as f64);
            let _ = tx.send(merged);
        };

        loop {
            tokio::select! {
                changed = window_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let window = window_rx.borrow_and_update().clone();
                    if let Some(window) = window {
                        if let Some((key, request)) = coordinator.on_window(window, Utc::now()) {
                            self.spawn_fetch(key, request, &results_tx);
                        }
                    }
                }

                changed = feed.bars_rx.changed() => {
                    match changed {
                        Ok(()) => {
                            live_bars = feed.bars_rx.borrow_and_update().clone();
                            publish(&coordinator, &live_bars, &merged_tx);
                        }
                        Err(_) => {
                            // Feed task ended (transport failure). Keep the
                            // stale buffer on screen and stop polling it.
                            feed = FeedSlot::idle();
                        }
                    }
                }

                Some((key, result)) = results_rx.recv() => {
                    coordinator.apply_fetch(key, result);
                    publish(&coordinator, &live_bars, &merged_tx);
                }

                cmd = control_rx.recv() => {
                    match cmd {
                        Some(Command::SetSymbol(symbol)) => {
                            if coordinator.set_symbol(&symbol) {
                                // Synchronous teardown before any new async
                                // work: buffer cleared, transport closed.
                                feed.detach();
                                live_bars.clear();
                                publish(&coordinator, &live_bars, &merged_tx);

                                feed = self.attach_feed(&symbol, coordinator.live_enabled());
                                if let Some((key, request)) = coordinator.evaluate_now(Utc::now()) {
                                    self.spawn_fetch(key, request, &results_tx);
                                }
                            }
                        }
                        Some(Command::SetLive(enabled)) => {
                            coordinator.set_live_enabled(enabled);
                            if enabled {
                                ticker.enable();
                                feed.detach();
                                feed = self.attach_feed(coordinator.symbol(), true);
                            } else {
                                ticker.disable();
                                feed.detach();
                                live_bars.clear();
                            }
                            publish(&coordinator, &live_bars, &merged_tx);
                        }
                        Some(Command::ForceRefetch) => {
                            if let Some((key, request)) = coordinator.force_refetch(Utc::now()) {
                                self.spawn_fetch(key, request, &results_tx);
                            }
                        }
                        Some(Command::Shutdown) | None => {
                            feed.detach();
                            ticker.disable();
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("Sync engine stopped");
    }
}
