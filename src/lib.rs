//! Terminal candle charts fed by the Bitfinex WebSocket v2 API.
//!
//! Subscribes to one `candles` channel at a time, turns the snapshot and
//! the live updates into an ordered candle series, and keeps the
//! connection honest with a ping/pong heartbeat. The last chosen
//! timeframe, market and series type are remembered between runs.

pub mod chart;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tls;
pub mod tui;
pub mod websocket;

pub use error::{ChartError, Result};
