//! Live tick stream client
//!
//! One persistent subscription per active symbol, converted into a bounded,
//! throttled buffer of synthesized bars.

mod live;
mod types;

pub use live::{FeedHandle, LiveFeed, TickStream, MAX_LIVE_BARS, THROTTLE_WINDOW_MS};
pub use types::{QuoteTick, StreamState};
