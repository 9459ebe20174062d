//! Coordinator types

use chrono::{DateTime, Utc};

/// Record of the last backfill trigger, used to rate-limit further triggers
///
/// Written *before* the fetch resolves: the guard is time-based, not an
/// in-flight lock, so a trigger arriving during a slow fetch is suppressed
/// until the cooldown elapses rather than immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefetchMarker {
    pub symbol: String,
    pub session_key: String,
    pub triggered_at: DateTime<Utc>,
}

/// Why a refetch fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchReason {
    /// No prior refetch for this coordinator instance
    FirstFetch,
    /// Symbol differs from the last refetch
    SymbolChanged,
    /// Exchange-local day rolled over
    SessionRolled,
    /// Cooldown interval elapsed
    CooldownElapsed,
    /// Caller-requested immediate resync
    Forced,
}

/// Identity of an in-flight fetch, captured at trigger time
///
/// A response is applied only if its key still matches current state;
/// anything else is stale and discarded on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchKey {
    pub symbol: String,
    pub session_key: String,
}
