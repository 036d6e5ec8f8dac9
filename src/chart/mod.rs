//! Candle normalization and the chart surface contract.
//!
//! - [`normalize`] - raw exchange tuples to ascending [`Candle`] series
//! - [`series`] - the in-memory surface the terminal renders from
//! - [`adapter`] - guards around the surface used by the connection
//! - [`legend`] - cross-hair readout for a single candle

pub mod adapter;
pub mod legend;
pub mod normalize;
pub mod series;

pub use adapter::ChartSinkAdapter;
pub use legend::{Legend, Trend};
pub use normalize::{normalize_one, normalize_snapshot};
pub use series::CandleSeries;

use crate::models::Candle;

/// Reasons a chart surface refuses data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SinkError {
    /// An update arrived before any snapshot established the series.
    #[error("update before the initial series was set")]
    NotInitialized,

    /// A candle carried a NaN or infinite price.
    #[error("candle at {time} has non-finite prices")]
    InvalidCandle { time: i64 },

    /// An update was older than the newest point in the series.
    #[error("cannot update candle at {time}, series already ends at {last}")]
    OutOfOrder { time: i64, last: i64 },

    /// A snapshot was not in ascending time order.
    #[error("series data not ascending: {time} follows {previous}")]
    Unsorted { time: i64, previous: i64 },
}

/// A rendering surface that accepts an ordered candle series.
pub trait ChartSink {
    /// Replaces the whole series. `candles` must be ascending by time.
    fn set_data(&mut self, candles: Vec<Candle>) -> Result<(), SinkError>;

    /// Overwrites the newest point or appends a newer one.
    fn update(&mut self, candle: Candle) -> Result<(), SinkError>;

    /// Looks up the candle at `time` for cross-hair readouts.
    fn candle_at(&self, time: i64) -> Option<&Candle>;
}
