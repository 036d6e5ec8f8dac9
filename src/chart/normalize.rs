//! Maps exchange tuples onto [`Candle`]s.

use crate::models::{Candle, RawTick};

/// Converts one exchange tick into a candle.
pub fn normalize_one(tick: &RawTick) -> Candle {
    Candle {
        time: tick.timestamp_ms.div_euclid(1000),
        open: tick.open,
        high: tick.high,
        low: tick.low,
        close: tick.close,
    }
}

/// Converts a bulk payload into a series ascending by time.
///
/// The feed does not order snapshot entries. The sort is stable, and when
/// several ticks share a timestamp the one that came last wins, so the
/// result is strictly increasing.
pub fn normalize_snapshot(ticks: &[RawTick]) -> Vec<Candle> {
    let mut candles: Vec<Candle> = ticks.iter().map(normalize_one).collect();
    candles.sort_by_key(|c| c.time);

    let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match deduped.last_mut() {
            Some(last) if last.time == candle.time => *last = candle,
            _ => deduped.push(candle),
        }
    }

    deduped
}
