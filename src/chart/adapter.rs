//! Guards between the feed connection and a [`ChartSink`].

use tracing::{debug, warn};

use super::{ChartSink, Legend, SinkError};
use crate::models::Candle;

/// Wraps a chart surface and enforces what the feed side may push into it:
/// no update before the first series, and no non-finite prices.
#[derive(Debug)]
pub struct ChartSinkAdapter<K> {
    sink: K,
    initialized: bool,
}

impl<K: ChartSink> ChartSinkAdapter<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            initialized: false,
        }
    }

    /// Read access for renderers.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Replaces the series. Candles with non-finite prices are left out.
    ///
    /// # Errors
    ///
    /// Propagates the sink's rejection; the previous series stays in place.
    pub fn set_data(&mut self, candles: Vec<Candle>) -> Result<(), SinkError> {
        let total = candles.len();
        let candles: Vec<Candle> = candles.into_iter().filter(Candle::is_finite).collect();
        if candles.len() < total {
            warn!(
                dropped = total - candles.len(),
                "Dropped snapshot candles with non-finite prices"
            );
        }

        self.sink.set_data(candles)?;
        self.initialized = true;
        debug!("Chart series replaced");

        Ok(())
    }

    /// Pushes one live point.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::NotInitialized`] before the first snapshot,
    /// [`SinkError::InvalidCandle`] for non-finite prices, or whatever the
    /// sink rejects (e.g. [`SinkError::OutOfOrder`]).
    pub fn update(&mut self, candle: Candle) -> Result<(), SinkError> {
        if !self.initialized {
            return Err(SinkError::NotInitialized);
        }
        if !candle.is_finite() {
            return Err(SinkError::InvalidCandle { time: candle.time });
        }

        self.sink.update(candle)
    }

    /// Cross-hair readout for the candle at `time`.
    pub fn legend_at(&self, title: &str, time: i64) -> Option<Legend> {
        self.sink
            .candle_at(time)
            .map(|candle| Legend::new(title, candle))
    }
}
