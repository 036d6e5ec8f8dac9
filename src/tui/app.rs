//! Application state for the TUI.

use crate::chart::CandleSeries;
use crate::models::{SubscriptionParams, Timeframe};

/// Central application state container.
#[derive(Debug)]
pub struct App {
    /// Current chart settings; changing them means a new feed connection.
    pub params: SubscriptionParams,
    /// Open time of the candle under the cross-hair. Stays on that candle
    /// while newer ones arrive.
    pub crosshair: Option<i64>,
    /// Ticks seen so far, drives the loading spinner.
    pub ticks: u64,
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates a new App showing `params`.
    pub fn new(params: SubscriptionParams) -> Self {
        Self {
            params,
            crosshair: None,
            ticks: 0,
            should_quit: false,
        }
    }

    /// Selects a timeframe. Returns `true` if it changed.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> bool {
        if self.params.timeframe == timeframe {
            return false;
        }
        self.params.timeframe = timeframe;
        self.crosshair = None;
        true
    }

    /// Switches to the next market.
    pub fn next_market(&mut self) {
        self.params.next_market();
        self.crosshair = None;
    }

    /// Switches between candlesticks and bars.
    pub fn toggle_series(&mut self) {
        self.params.series_kind.toggle();
    }

    /// Moves the cross-hair one candle back in time, starting at the newest.
    /// A cross-hair whose candle left the series restarts at the newest.
    pub fn crosshair_back(&mut self, series: &CandleSeries) {
        let target = match self.crosshair.and_then(|time| series.position(time)) {
            None => series.last(),
            Some(index) => series.get(index.saturating_sub(1)),
        };
        self.crosshair = target.map(|candle| candle.time);
    }

    /// Moves the cross-hair one candle forward in time; past the newest it
    /// disappears.
    pub fn crosshair_forward(&mut self, series: &CandleSeries) {
        self.crosshair = self
            .crosshair
            .and_then(|time| series.position(time))
            .and_then(|index| series.get(index + 1))
            .map(|candle| candle.time);
    }

    pub fn clear_crosshair(&mut self) {
        self.crosshair = None;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(SubscriptionParams::default())
    }
}
