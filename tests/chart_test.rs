//! Candle normalization, series and adapter tests.

use bfxchart::chart::{
    CandleSeries, ChartSink, ChartSinkAdapter, Legend, SinkError, Trend, normalize_one,
    normalize_snapshot,
};
use bfxchart::models::{Candle, RawTick};

fn tick(timestamp_ms: i64, open: f64, close: f64, high: f64, low: f64) -> RawTick {
    RawTick {
        timestamp_ms,
        open,
        close,
        high,
        low,
    }
}

fn candle(time: i64, close: f64) -> Candle {
    Candle {
        time,
        open: 10.0,
        high: close.max(10.0) + 1.0,
        low: close.min(10.0) - 1.0,
        close,
    }
}

#[test]
fn test_normalize_one_maps_tuple_fields() {
    let c = normalize_one(&tick(1_700_000_059_999, 1.0, 2.0, 3.0, 0.5));

    assert_eq!(c.time, 1_700_000_059);
    assert_eq!(c.open, 1.0);
    assert_eq!(c.close, 2.0);
    assert_eq!(c.high, 3.0);
    assert_eq!(c.low, 0.5);
}

#[test]
fn test_normalize_one_floors_negative_timestamps() {
    assert_eq!(normalize_one(&tick(-1, 1.0, 1.0, 1.0, 1.0)).time, -1);
}

#[test]
fn test_normalize_snapshot_sorts_ascending() {
    let ticks = [
        tick(3_000, 3.0, 3.0, 3.0, 3.0),
        tick(1_000, 1.0, 1.0, 1.0, 1.0),
        tick(2_000, 2.0, 2.0, 2.0, 2.0),
    ];

    let candles = normalize_snapshot(&ticks);

    let times: Vec<i64> = candles.iter().map(|c| c.time).collect();
    assert_eq!(times, vec![1, 2, 3]);

    // Sorting sorted output changes nothing.
    let mut resorted = candles.clone();
    resorted.sort_by_key(|c| c.time);
    assert_eq!(resorted, candles);
}

#[test]
fn test_normalize_snapshot_keeps_last_duplicate() {
    let ticks = [
        tick(1_000, 1.0, 1.0, 1.0, 1.0),
        tick(1_500, 9.0, 9.0, 9.0, 9.0),
        tick(2_000, 2.0, 2.0, 2.0, 2.0),
    ];

    let candles = normalize_snapshot(&ticks);

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].time, 1);
    assert_eq!(candles[0].open, 9.0);
}

#[test]
fn test_normalize_snapshot_empty() {
    assert!(normalize_snapshot(&[]).is_empty());
}

#[test]
fn test_series_set_data_replaces_contents() {
    let mut series = CandleSeries::new();
    series.set_data(vec![candle(1, 11.0), candle(2, 12.0)]).unwrap();
    series.set_data(vec![candle(5, 15.0)]).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.last().unwrap().time, 5);
}

#[test]
fn test_series_rejects_unsorted_data() {
    let mut series = CandleSeries::new();
    series.set_data(vec![candle(1, 11.0)]).unwrap();

    let result = series.set_data(vec![candle(2, 12.0), candle(1, 11.0)]);

    assert_eq!(
        result,
        Err(SinkError::Unsorted {
            time: 1,
            previous: 2
        })
    );
    // Untouched on failure.
    assert_eq!(series.len(), 1);
}

#[test]
fn test_series_update_rules() {
    let mut series = CandleSeries::new();
    series.set_data(vec![candle(10, 11.0), candle(20, 12.0)]).unwrap();

    series.update(candle(20, 13.0)).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.last().unwrap().close, 13.0);

    series.update(candle(30, 14.0)).unwrap();
    assert_eq!(series.len(), 3);

    assert_eq!(
        series.update(candle(15, 1.0)),
        Err(SinkError::OutOfOrder { time: 15, last: 30 })
    );
    assert_eq!(series.len(), 3);
}

#[test]
fn test_series_is_bounded() {
    let mut series = CandleSeries::with_max_len(3);
    series
        .set_data((1..=5).map(|t| candle(t, 10.0)).collect())
        .unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.iter().next().unwrap().time, 3);

    series.update(candle(6, 10.0)).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.iter().next().unwrap().time, 4);
}

#[test]
fn test_series_lookup() {
    let mut series = CandleSeries::new();
    series
        .set_data(vec![candle(10, 1.0), candle(20, 2.0), candle(30, 3.0)])
        .unwrap();

    assert_eq!(series.candle_at(20).unwrap().close, 2.0);
    assert!(series.candle_at(25).is_none());
    assert_eq!(series.position(30), Some(2));
    assert_eq!(series.position(25), None);
    assert_eq!(series.get(0).unwrap().time, 10);
    assert!(series.get(3).is_none());
}

#[test]
fn test_adapter_rejects_update_before_data() {
    let mut adapter = ChartSinkAdapter::new(CandleSeries::new());

    assert_eq!(
        adapter.update(candle(1, 1.0)),
        Err(SinkError::NotInitialized)
    );
    assert!(adapter.sink().is_empty());
}

#[test]
fn test_adapter_filters_non_finite_snapshot_candles() {
    let mut adapter = ChartSinkAdapter::new(CandleSeries::new());
    let mut bad = candle(2, 12.0);
    bad.high = f64::NAN;

    adapter
        .set_data(vec![candle(1, 11.0), bad, candle(3, 13.0)])
        .unwrap();

    let times: Vec<i64> = adapter.sink().iter().map(|c| c.time).collect();
    assert_eq!(times, vec![1, 3]);

    // Updates are accepted once a series exists.
    assert_eq!(adapter.update(candle(4, 14.0)), Ok(()));
}

#[test]
fn test_adapter_rejects_non_finite_update() {
    let mut adapter = ChartSinkAdapter::new(CandleSeries::new());
    adapter.set_data(vec![candle(1, 11.0)]).unwrap();

    let mut bad = candle(2, 12.0);
    bad.close = f64::INFINITY;

    assert_eq!(
        adapter.update(bad),
        Err(SinkError::InvalidCandle { time: 2 })
    );
    assert_eq!(adapter.sink().len(), 1);
}

#[test]
fn test_adapter_legend() {
    let mut adapter = ChartSinkAdapter::new(CandleSeries::new());
    adapter
        .set_data(vec![candle(1, 12.0), candle(2, 8.0)])
        .unwrap();

    let up = adapter.legend_at("tBTCUSD 1m", 1).unwrap();
    assert_eq!(up.trend, Trend::Up);
    assert_eq!(up.title, "tBTCUSD 1m");

    let down = adapter.legend_at("tBTCUSD 1m", 2).unwrap();
    assert_eq!(down.trend, Trend::Down);

    assert!(adapter.legend_at("tBTCUSD 1m", 3).is_none());
}

#[test]
fn test_legend_fields_are_two_decimals() {
    let legend = Legend::new(
        "tETHUSD 1h",
        &Candle {
            time: 0,
            open: 1.0,
            high: 2.345,
            low: 0.5,
            close: 1.0,
        },
    );

    let fields = legend.fields();
    assert_eq!(fields[0], ("OPEN", "1.00".to_string()));
    assert_eq!(fields[1].0, "HIGH");
    assert_eq!(fields[3], ("CLOSE", "1.00".to_string()));
    // Flat candles read as down.
    assert_eq!(legend.trend, Trend::Down);
}
