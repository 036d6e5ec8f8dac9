//! Cross-hair legend shown over the chart.

use crate::models::Candle;

/// Direction of a candle, used to colour its legend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

/// Price readout for a single candle.
#[derive(Clone, Debug, PartialEq)]
pub struct Legend {
    /// Context line, e.g. `tBTCUSD 1m`.
    pub title: String,
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub trend: Trend,
}

impl Legend {
    pub fn new(title: impl Into<String>, candle: &Candle) -> Self {
        Self {
            title: title.into(),
            time: candle.time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            // A flat candle reads as down.
            trend: if candle.is_bullish() {
                Trend::Up
            } else {
                Trend::Down
            },
        }
    }

    /// Labelled prices in display order, formatted to two decimals.
    pub fn fields(&self) -> [(&'static str, String); 4] {
        [
            ("OPEN", format!("{:.2}", self.open)),
            ("HIGH", format!("{:.2}", self.high)),
            ("LOW", format!("{:.2}", self.low)),
            ("CLOSE", format!("{:.2}", self.close)),
        ]
    }
}
