//! Run command implementation

use crate::config::Config;
use crate::history::{HistoryClient, HistoryConfig};
use crate::sync::SyncEngine;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured symbol
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Start with live streaming disabled (historical only)
    #[arg(long)]
    pub no_live: bool,
}

impl RunArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(symbol) = &self.symbol {
            config.feed.symbol = symbol.clone();
        }
        if self.no_live {
            config.feed.live_enabled = false;
        }
        config.validate()?;

        let history = Arc::new(HistoryClient::new(HistoryConfig {
            base_url: config.history.base_url.clone(),
            timeout: Duration::from_secs(config.history.timeout_secs),
            access_token: config.history.access_token.clone(),
        })?);

        tracing::info!(
            symbol = %config.feed.symbol,
            live = config.feed.live_enabled,
            "Starting sync engine"
        );

        let handle = SyncEngine::new(config, history).spawn();
        let mut merged = handle.merged();

        loop {
            tokio::select! {
                changed = merged.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let series = merged.borrow_and_update().clone();
                    let last = series.last().map(|bar| bar.close.to_string());
                    tracing::info!(
                        bars = series.len(),
                        last_close = last.as_deref().unwrap_or("-"),
                        "Merged series updated"
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down");
                    handle.shutdown().await;
                    break;
                }
            }
        }

        Ok(())
    }
}
