//! Historical bar fetch boundary
//!
//! The backend is an external collaborator; only the request/response
//! contract lives here.

mod client;
mod types;

pub use client::{HistoryClient, HistoryConfig};
pub use types::{HistoryError, HistoryRequest};

use crate::bar::Bar;
use async_trait::async_trait;

/// Trait for historical bar providers
///
/// Seam for the coordinator: production uses [`HistoryClient`], tests supply
/// a scripted implementation.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetch ordered bars for the requested range
    async fn fetch_bars(&self, request: &HistoryRequest) -> anyhow::Result<Vec<Bar>>;
}
