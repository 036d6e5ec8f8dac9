//! Candle channel data points.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single OHLC price bar keyed by its bucket start in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Returns `true` when every price is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Returns `true` when the bar closed above its open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// A candle as the exchange sends it: `[mts, open, close, high, low, volume]`.
///
/// Only the first five positions are read. Note that close comes before
/// high and low on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTick {
    pub timestamp_ms: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl RawTick {
    /// Number of leading tuple positions that carry candle data.
    pub const FIELDS: usize = 5;

    /// Builds a tick from a JSON tuple.
    ///
    /// Returns `None` when the tuple has fewer than five positions or one
    /// of them is not a number.
    pub fn from_values(values: &[Value]) -> Option<Self> {
        if values.len() < Self::FIELDS {
            return None;
        }

        let timestamp_ms = values[0]
            .as_i64()
            .or_else(|| values[0].as_f64().map(|ms| ms as i64))?;

        Some(Self {
            timestamp_ms,
            open: values[1].as_f64()?,
            close: values[2].as_f64()?,
            high: values[3].as_f64()?,
            low: values[4].as_f64()?,
        })
    }
}
