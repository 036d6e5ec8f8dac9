//! In-memory candle series backing the terminal chart.

use std::collections::VecDeque;

use super::{ChartSink, SinkError};
use crate::models::Candle;

/// Maximum number of candles kept; the oldest are dropped first.
pub const MAX_SERIES_LEN: usize = 10_000;

/// Ascending, time-unique candle series.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: VecDeque<Candle>,
    max_len: usize,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self::with_max_len(MAX_SERIES_LEN)
    }

    /// Creates a series that keeps at most `max_len` candles.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            candles: VecDeque::new(),
            max_len: max_len.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Newest candle.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Candle> + ExactSizeIterator {
        self.candles.iter()
    }

    /// Candle at `index`, counted from the oldest.
    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    /// Index of the candle opening at `time`.
    pub fn position(&self, time: i64) -> Option<usize> {
        self.candles.binary_search_by_key(&time, |c| c.time).ok()
    }

    fn push_bounded(&mut self, candle: Candle) {
        if self.candles.len() >= self.max_len {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
    }
}

impl Default for CandleSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSink for CandleSeries {
    fn set_data(&mut self, candles: Vec<Candle>) -> Result<(), SinkError> {
        if let Some(pair) = candles.windows(2).find(|w| w[1].time < w[0].time) {
            return Err(SinkError::Unsorted {
                time: pair[1].time,
                previous: pair[0].time,
            });
        }

        self.candles.clear();
        for candle in candles {
            match self.candles.back_mut() {
                Some(last) if last.time == candle.time => *last = candle,
                _ => self.push_bounded(candle),
            }
        }

        Ok(())
    }

    fn update(&mut self, candle: Candle) -> Result<(), SinkError> {
        match self.candles.back_mut() {
            Some(last) if candle.time < last.time => Err(SinkError::OutOfOrder {
                time: candle.time,
                last: last.time,
            }),
            Some(last) if candle.time == last.time => {
                *last = candle;
                Ok(())
            }
            _ => {
                self.push_bounded(candle);
                Ok(())
            }
        }
    }

    fn candle_at(&self, time: i64) -> Option<&Candle> {
        self.position(time).and_then(|i| self.candles.get(i))
    }
}
