//! Backfill-and-merge coordination
//!
//! Keeps the displayed series complete (periodic historical refetch within
//! the session window) and current (live bars), merged into one ordered
//! sequence.

mod coordinator;
mod engine;
mod types;

pub use coordinator::{merge, should_refetch, Coordinator};
pub use engine::{Command, SyncEngine, SyncHandle};
pub use types::{FetchKey, RefetchMarker, RefetchReason};
