//! Session window computation

use crate::config::SessionConfig;
use chrono::{DateTime, FixedOffset, NaiveTime, SecondsFormat, TimeZone, Utc};

/// Largest UTC offset accepted for window computation, ±17:59
const MAX_UTC_OFFSET_MINS: i32 = 18 * 60 - 1;

/// One instant serialized in the two textual conventions the two backend
/// endpoints require: one accepts a trailing zone suffix, the other
/// rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStamp {
    /// RFC 3339 with the exchange's fixed offset, e.g. "2026-08-24T09:15:00+05:30"
    pub zoned: String,
    /// Exchange-local wall time with no zone, e.g. "2026-08-24 09:15:00"
    pub plain: String,
}

impl FetchStamp {
    fn from_instant(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = instant.with_timezone(&offset);
        Self {
            zoned: local.to_rfc3339_opts(SecondsFormat::Secs, false),
            plain: local.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// The current trading session's bounds in absolute time
///
/// `end` is the instant of computation, not the published close: the window
/// grows with wall-clock time so the visible series always reaches "now".
/// Never mutated in place; each recomputation produces a fresh value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWindow {
    /// Regular-session open for the exchange-local calendar day
    pub start: DateTime<Utc>,
    /// Current wall-clock instant at computation time
    pub end: DateTime<Utc>,
    /// `start` in both backend serialization conventions
    pub fetch_start: FetchStamp,
    /// `end` in both backend serialization conventions
    pub fetch_end: FetchStamp,
    /// Exchange-local calendar day, "YYYY-MM-DD"; changes on day rollover
    pub session_key: String,
}

/// Compute the session window for the supplied instant
///
/// Pure function of `now` so callers and tests control the clock. Two calls
/// within the same exchange-local calendar day yield the same `start` and
/// `session_key`; `end` advances with `now`. Holidays and half-days are not
/// modeled: the window is always computed as if today trades, and callers
/// must tolerate an empty historical result.
pub fn compute_window(config: &SessionConfig, now: DateTime<Utc>) -> SessionWindow {
    // Config::load rejects out-of-range values, but SessionConfig has public
    // fields; clamping keeps the computation total for hand-built configs.
    let offset_mins = config
        .utc_offset_mins
        .clamp(-MAX_UTC_OFFSET_MINS, MAX_UTC_OFFSET_MINS);
    let offset = FixedOffset::east_opt(offset_mins * 60).expect("offset clamped into range");
    let open_time =
        NaiveTime::from_hms_opt(config.open_hour.min(23), config.open_min.min(59), 0)
            .expect("open time clamped into range");

    let local_date = now.with_timezone(&offset).date_naive();
    // Fixed offsets have no DST fold, so this mapping is always unique.
    let start = offset
        .from_local_datetime(&local_date.and_time(open_time))
        .single()
        .expect("fixed offset is unambiguous")
        .with_timezone(&Utc);

    SessionWindow {
        start,
        end: now,
        fetch_start: FetchStamp::from_instant(start, offset),
        fetch_end: FetchStamp::from_instant(now, offset),
        session_key: local_date.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn nse() -> SessionConfig {
        SessionConfig::default()
    }

    #[test]
    fn test_open_is_0345_utc_for_nse() {
        // 2026-08-24 09:20 IST == 03:50 UTC
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 3, 50, 0).unwrap();
        let window = compute_window(&nse(), now);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 8, 24, 3, 45, 0).unwrap());
        assert_eq!(window.end, now);
        assert_eq!(window.session_key, "2026-08-24");
    }

    #[test]
    fn test_same_day_stability() {
        let morning = Utc.with_ymd_and_hms(2026, 8, 24, 4, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2026, 8, 24, 9, 30, 0).unwrap();

        let a = compute_window(&nse(), morning);
        let b = compute_window(&nse(), afternoon);

        assert_eq!(a.start, b.start);
        assert_eq!(a.session_key, b.session_key);
        assert!(b.end > a.end, "end must advance with the clock");
    }

    #[test]
    fn test_day_rollover_changes_key_and_start() {
        let today = Utc.with_ymd_and_hms(2026, 8, 24, 9, 30, 0).unwrap();
        let tomorrow = today + Duration::days(1);

        let a = compute_window(&nse(), today);
        let b = compute_window(&nse(), tomorrow);

        assert_ne!(a.session_key, b.session_key);
        assert!(b.start > a.start);
    }

    #[test]
    fn test_local_date_not_utc_date() {
        // 2026-08-24 20:00 UTC is already 2026-08-25 01:30 IST.
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 20, 0, 0).unwrap();
        let window = compute_window(&nse(), now);
        assert_eq!(window.session_key, "2026-08-25");
    }

    #[test]
    fn test_out_of_range_config_is_clamped_not_panicking() {
        // Hand-built config that skipped Config::validate.
        let config = SessionConfig {
            utc_offset_mins: 40 * 60,
            open_hour: 99,
            open_min: 99,
            refresh_secs: 30,
        };
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 3, 50, 0).unwrap();
        let window = compute_window(&config, now);

        // Offset clamps to +17:59, open time to 23:59.
        assert_eq!(window.session_key, "2026-08-24");
        assert!(window.fetch_start.plain.ends_with("23:59:00"));
    }

    #[test]
    fn test_fetch_stamp_conventions() {
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 3, 50, 0).unwrap();
        let window = compute_window(&nse(), now);

        assert_eq!(window.fetch_start.zoned, "2026-08-24T09:15:00+05:30");
        assert_eq!(window.fetch_start.plain, "2026-08-24 09:15:00");
        assert_eq!(window.fetch_end.zoned, "2026-08-24T09:20:00+05:30");
        assert_eq!(window.fetch_end.plain, "2026-08-24 09:20:00");
    }
}
