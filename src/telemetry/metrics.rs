//! Metric names and registration

use metrics::{describe_counter, describe_gauge};

/// Live ticks accepted past the throttle
pub const TICKS_ACCEPTED: &str = "intraday_sync_ticks_accepted_total";
/// Live ticks discarded by the 1 s sampling window
pub const TICKS_DROPPED: &str = "intraday_sync_ticks_throttled_total";
/// Historical refetches triggered
pub const REFETCHES: &str = "intraday_sync_refetches_total";
/// Historical responses discarded because their context went stale
pub const STALE_RESPONSES: &str = "intraday_sync_stale_responses_total";
/// Length of the last published merged series
pub const MERGED_LEN: &str = "intraday_sync_merged_series_len";

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(TICKS_ACCEPTED, "Live ticks accepted past the throttle");
    describe_counter!(TICKS_DROPPED, "Live ticks discarded by the sampling window");
    describe_counter!(REFETCHES, "Historical refetches triggered");
    describe_counter!(STALE_RESPONSES, "Stale historical responses discarded");
    describe_gauge!(MERGED_LEN, "Length of the last published merged series");
}
