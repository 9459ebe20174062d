//! Fetch command implementation

use crate::config::Config;
use crate::history::{HistoryClient, HistoryConfig, HistoryProvider, HistoryRequest};
use crate::session::compute_window;
use chrono::Utc;
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Override the configured symbol
    #[arg(short, long)]
    pub symbol: Option<String>,
}

impl FetchArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let symbol = self
            .symbol
            .clone()
            .unwrap_or_else(|| config.feed.symbol.clone());
        let window = compute_window(&config.session, Utc::now());

        let client = HistoryClient::new(HistoryConfig {
            base_url: config.history.base_url.clone(),
            timeout: Duration::from_secs(config.history.timeout_secs),
            access_token: config.history.access_token.clone(),
        })?;

        let request = HistoryRequest {
            symbol: symbol.clone(),
            interval: config.history.interval.clone(),
            from: window.fetch_start.plain.clone(),
            to: window.fetch_end.plain.clone(),
        };

        let bars = client.fetch_bars(&request).await?;

        println!("{} bars for {} ({})", bars.len(), symbol, window.session_key);
        if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
            println!("  first: {}  close {}", first.ts, first.close);
            println!("  last:  {}  close {}", last.ts, last.close);
        }

        Ok(())
    }
}
