//! Periodic session window publication

use super::window::{compute_window, SessionWindow};
use crate::config::SessionConfig;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Publishes the current [`SessionWindow`] on a watch channel
///
/// While enabled, a fresh window is published immediately and then on the
/// configured cadence (30 s by default). Disabling publishes `None` and
/// stops recomputation. Computation is pure and cannot fail.
pub struct SessionTicker {
    config: SessionConfig,
    tx: Arc<watch::Sender<Option<SessionWindow>>>,
    task: Option<JoinHandle<()>>,
}

impl SessionTicker {
    /// Create a disabled ticker; subscribers see `None` until enabled
    pub fn new(config: SessionConfig) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            config,
            tx: Arc::new(tx),
            task: None,
        }
    }

    /// Subscribe to window updates
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionWindow>> {
        self.tx.subscribe()
    }

    /// Start publishing: one window now, then one per refresh interval
    pub fn enable(&mut self) {
        if self.task.is_some() {
            return;
        }

        let config = self.config.clone();
        let tx = Arc::clone(&self.tx);
        let period = Duration::from_secs(config.refresh_secs);

        // First tick of the interval fires immediately.
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let window = compute_window(&config, Utc::now());
                tracing::trace!(session_key = %window.session_key, "Session window recomputed");
                if tx.send(Some(window)).is_err() {
                    tracing::debug!("Window receiver dropped, stopping session ticker");
                    break;
                }
            }
        }));
    }

    /// Stop publishing and clear the current window
    pub fn disable(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let _ = self.tx.send(None);
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SessionConfig {
        SessionConfig {
            refresh_secs: 1,
            ..SessionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_enable_publishes_immediately() {
        let mut ticker = SessionTicker::new(fast_config());
        let mut rx = ticker.subscribe();
        assert!(rx.borrow().is_none());

        ticker.enable();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());
    }

    #[tokio::test]
    async fn test_disable_publishes_none() {
        let mut ticker = SessionTicker::new(fast_config());
        let mut rx = ticker.subscribe();

        ticker.enable();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        ticker.disable();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_enable_twice_is_idempotent() {
        let mut ticker = SessionTicker::new(fast_config());
        ticker.enable();
        ticker.enable();
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_republishes_on_cadence() {
        let mut ticker = SessionTicker::new(fast_config());
        let mut rx = ticker.subscribe();
        ticker.enable();

        rx.changed().await.unwrap();
        let first = rx.borrow_and_update().clone().unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        rx.changed().await.unwrap();
        let second = rx.borrow_and_update().clone().unwrap();

        // Same real day, so start/key are stable while the publication repeats.
        assert_eq!(first.session_key, second.session_key);
        assert_eq!(first.start, second.start);
    }
}
