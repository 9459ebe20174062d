//! Trading session window calculation
//!
//! Derives "today's" session bounds for the exchange in absolute time and
//! republishes them on a fixed cadence while live mode is enabled.

mod ticker;
mod window;

pub use ticker::SessionTicker;
pub use window::{compute_window, FetchStamp, SessionWindow};
