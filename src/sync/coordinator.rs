//! Refetch decision rule, merge, and coordinator state

use super::types::{FetchKey, RefetchMarker, RefetchReason};
use crate::bar::Bar;
use crate::history::HistoryRequest;
use crate::session::SessionWindow;
use crate::telemetry;
use chrono::{DateTime, Duration, Utc};

/// Decide whether a historical refetch is due
///
/// Pure function of the cooldown marker, current symbol/window, and the
/// clock. Refetch iff no prior trigger, the symbol changed, the session
/// rolled over, or the cooldown elapsed. Bounds backend calls to roughly
/// one per cooldown during live viewing no matter how often the window
/// republishes.
pub fn should_refetch(
    marker: Option<&RefetchMarker>,
    symbol: &str,
    window: &SessionWindow,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<RefetchReason> {
    let Some(marker) = marker else {
        return Some(RefetchReason::FirstFetch);
    };
    if marker.symbol != symbol {
        return Some(RefetchReason::SymbolChanged);
    }
    if marker.session_key != window.session_key {
        return Some(RefetchReason::SessionRolled);
    }
    if now - marker.triggered_at > cooldown {
        return Some(RefetchReason::CooldownElapsed);
    }
    None
}

/// Merge historical and live bars into one ascending-timestamp sequence
///
/// Pass-through when live mode is disabled. Otherwise a concat and stable
/// sort: O(n log n) per recomputation, which is fine with the live buffer
/// bounded. The stable sort keeps historical bars ahead of live bars on an
/// exact timestamp tie.
pub fn merge(historical: &[Bar], live: &[Bar], live_enabled: bool) -> Vec<Bar> {
    if !live_enabled {
        return historical.to_vec();
    }
    let mut out = Vec::with_capacity(historical.len() + live.len());
    out.extend_from_slice(historical);
    out.extend_from_slice(live);
    out.sort_by_key(|bar| bar.ts);
    out
}

/// Owns one symbol's backfill state
///
/// All mutation happens from the single engine task; no locking. In-flight
/// fetches are keyed by `(symbol, session_key)` captured at trigger time and
/// applied only if the key still matches, so a stale response can never
/// overwrite state for the now-current context.
pub struct Coordinator {
    symbol: String,
    live_enabled: bool,
    interval: String,
    cooldown: Duration,
    marker: Option<RefetchMarker>,
    window: Option<SessionWindow>,
    historical: Vec<Bar>,
    last_error: Option<String>,
}

impl Coordinator {
    pub fn new(
        symbol: impl Into<String>,
        live_enabled: bool,
        interval: impl Into<String>,
        cooldown_secs: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            live_enabled,
            interval: interval.into(),
            cooldown: Duration::seconds(cooldown_secs as i64),
            marker: None,
            window: None,
            historical: Vec::new(),
            last_error: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn live_enabled(&self) -> bool {
        self.live_enabled
    }

    /// Last fetch failure, retained for display until the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn historical(&self) -> &[Bar] {
        &self.historical
    }

    /// Toggle live mode; disabling forgets the window so any in-flight
    /// response arrives stale and is discarded
    pub fn set_live_enabled(&mut self, enabled: bool) {
        self.live_enabled = enabled;
        if !enabled {
            self.window = None;
        }
    }

    /// Switch symbols, resetting the marker and cached series
    ///
    /// Returns false if the symbol is unchanged. Must run before any
    /// asynchronous work for the new symbol begins so a response for the
    /// old symbol can never land on the new one's state.
    pub fn set_symbol(&mut self, symbol: &str) -> bool {
        if self.symbol == symbol {
            return false;
        }
        tracing::info!(from = %self.symbol, to = %symbol, "Switching symbol");
        self.symbol = symbol.to_string();
        self.marker = None;
        self.historical.clear();
        self.last_error = None;
        true
    }

    /// Observe a fresh session window; returns a fetch to issue if one is due
    pub fn on_window(
        &mut self,
        window: SessionWindow,
        now: DateTime<Utc>,
    ) -> Option<(FetchKey, HistoryRequest)> {
        let due = should_refetch(self.marker.as_ref(), &self.symbol, &window, now, self.cooldown);
        self.window = Some(window);
        due.and_then(|reason| self.trigger(reason, now))
    }

    /// Re-evaluate against the last seen window (e.g. right after a symbol
    /// switch, without waiting for the next window tick)
    pub fn evaluate_now(&mut self, now: DateTime<Utc>) -> Option<(FetchKey, HistoryRequest)> {
        let window = self.window.clone()?;
        let due = should_refetch(self.marker.as_ref(), &self.symbol, &window, now, self.cooldown);
        due.and_then(|reason| self.trigger(reason, now))
    }

    /// Caller-requested immediate resync, bypassing the cooldown
    pub fn force_refetch(&mut self, now: DateTime<Utc>) -> Option<(FetchKey, HistoryRequest)> {
        if self.window.is_none() {
            return None;
        }
        self.trigger(RefetchReason::Forced, now)
    }

    fn trigger(
        &mut self,
        reason: RefetchReason,
        now: DateTime<Utc>,
    ) -> Option<(FetchKey, HistoryRequest)> {
        let window = self.window.as_ref()?;

        tracing::info!(
            symbol = %self.symbol,
            session_key = %window.session_key,
            ?reason,
            "Triggering historical refetch"
        );
        metrics::counter!(telemetry::REFETCHES).increment(1);

        // Marker is recorded before the fetch resolves.
        self.marker = Some(RefetchMarker {
            symbol: self.symbol.clone(),
            session_key: window.session_key.clone(),
            triggered_at: now,
        });

        let key = FetchKey {
            symbol: self.symbol.clone(),
            session_key: window.session_key.clone(),
        };
        let request = HistoryRequest {
            symbol: self.symbol.clone(),
            interval: self.interval.clone(),
            from: window.fetch_start.plain.clone(),
            to: window.fetch_end.plain.clone(),
        };
        Some((key, request))
    }

    /// Apply a completed fetch, discarding it if its key is stale
    pub fn apply_fetch(&mut self, key: FetchKey, result: Result<Vec<Bar>, String>) {
        let current_session = self.window.as_ref().map(|w| w.session_key.as_str());
        if key.symbol != self.symbol || Some(key.session_key.as_str()) != current_session {
            tracing::debug!(
                stale_symbol = %key.symbol,
                stale_session = %key.session_key,
                current_symbol = %self.symbol,
                "Discarding stale historical response"
            );
            metrics::counter!(telemetry::STALE_RESPONSES).increment(1);
            return;
        }

        match result {
            Ok(bars) => {
                tracing::debug!(symbol = %self.symbol, count = bars.len(), "Historical series refreshed");
                self.historical = bars;
                self.last_error = None;
            }
            Err(e) => {
                // Keep showing the previous series; the next cooldown-eligible
                // trigger retries automatically.
                tracing::warn!(symbol = %self.symbol, error = %e, "Historical fetch failed");
                self.last_error = Some(e);
            }
        }
    }

    /// Merge the cached historical series with the given live buffer
    pub fn merged(&self, live: &[Bar]) -> Vec<Bar> {
        merge(&self.historical, live, self.live_enabled)
    }
}
