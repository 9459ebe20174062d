//! Deterministic end-to-end scenario
//!
//! Starting live viewing of RELIANCE at 09:20 exchange-local time: the
//! window opens at 09:15 local (03:45 UTC), a backfill fires immediately,
//! and a tick at 09:20:05 lands in the merged series as a degenerate bar
//! after every historical bar.

use chrono::{DateTime, Duration, TimeZone, Utc};
use intraday_sync::bar::Bar;
use intraday_sync::config::SessionConfig;
use intraday_sync::feed::TickStream;
use intraday_sync::session::compute_window;
use intraday_sync::sync::Coordinator;
use intraday_sync::ws::WsMessage;
use rust_decimal_macros::dec;

fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 24, h, m, s).unwrap()
}

#[test]
fn test_live_session_from_0920_local() {
    // 09:20 IST == 03:50 UTC.
    let start_of_viewing = utc(3, 50, 0);
    let window = compute_window(&SessionConfig::default(), start_of_viewing);

    assert_eq!(window.session_key, "2026-08-24");
    assert_eq!(window.start, utc(3, 45, 0));

    // Backfill triggers immediately on the first window.
    let mut coordinator = Coordinator::new("RELIANCE", true, "minute", 60);
    let (key, request) = coordinator
        .on_window(window, start_of_viewing)
        .expect("first window must trigger a backfill");
    assert_eq!(request.symbol, "RELIANCE");
    assert_eq!(request.from, "2026-08-24 09:15:00");

    // Backend returns the 09:15..09:19 minute candles.
    let historical: Vec<Bar> = (0..5)
        .map(|i| Bar {
            ts: utc(3, 45, 0) + Duration::minutes(i),
            open: dec!(2498),
            high: dec!(2501),
            low: dec!(2497),
            close: dec!(2499),
            volume: Some(1_000),
        })
        .collect();
    coordinator.apply_fetch(key, Ok(historical));
    assert_eq!(coordinator.historical().len(), 5);

    // A tick arrives at 09:20:05 local (03:50:05 UTC).
    let (mut stream, _rx) = TickStream::new("RELIANCE");
    stream.begin_connect();
    let received_at = utc(3, 50, 5).timestamp_millis();
    let frame = format!(
        r#"{{"type":"ticks","received_at":{received_at},"ticks":[{{"last_price":2500.5}}]}}"#
    );
    stream.handle_message(WsMessage::Text(frame), utc(3, 50, 6));

    let merged = coordinator.merged(&stream.buffer());
    assert_eq!(merged.len(), 6);

    let live_bar = merged.last().unwrap();
    assert_eq!(live_bar.ts, utc(3, 50, 5));
    assert_eq!(live_bar.open, dec!(2500.5));
    assert_eq!(live_bar.high, dec!(2500.5));
    assert_eq!(live_bar.low, dec!(2500.5));
    assert_eq!(live_bar.close, dec!(2500.5));
    assert!(live_bar.volume.is_none());

    // Every historical bar precedes the live bar.
    assert!(merged[..5].iter().all(|bar| bar.ts < live_bar.ts));
}
