//! Shared models for Bitfinex WebSocket v2 messages.
//!
//! Contains the outbound requests (subscribe, ping), the `event` objects
//! the server answers with, and the chart-facing data types.

pub mod candle;
pub mod subscription;

use serde::{Deserialize, Serialize};

pub use candle::{Candle, RawTick};
pub use subscription::{MARKETS, Market, SeriesKind, SubscriptionParams, Timeframe};

/// Wire name of the candles channel.
pub const CANDLES_CHANNEL: &str = "candles";

/// A `subscribe` request sent to the Bitfinex WebSocket API.
#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    pub event: String,
    pub channel: String,
    pub key: String,
}

impl SubscribeRequest {
    /// Builds the candles subscription for the given parameters.
    pub fn candles(params: &SubscriptionParams) -> Self {
        Self {
            event: "subscribe".to_string(),
            channel: CANDLES_CHANNEL.to_string(),
            key: params.key(),
        }
    }
}

/// A `ping` request used to test connection liveness.
#[derive(Debug, Serialize)]
pub struct PingRequest {
    pub event: String,
}

impl PingRequest {
    pub fn new() -> Self {
        Self {
            event: "ping".to_string(),
        }
    }
}

impl Default for PingRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Server response to a [`PingRequest`].
#[derive(Debug, Deserialize)]
pub struct PongResponse {
    pub event: String,
    pub ts: Option<u64>,
}

/// Acknowledges a [`SubscribeRequest`] and assigns the channel id that
/// prefixes every data frame of the subscription.
#[derive(Debug, Deserialize)]
pub struct SubscribedResponse {
    pub event: String,
    pub channel: String,
    #[serde(rename = "chanId")]
    pub chan_id: u64,
    pub key: Option<String>,
}

/// Error reply, e.g. for an unknown subscription key.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub event: String,
    pub code: Option<i64>,
    pub msg: Option<String>,
}

/// Greeting and platform notices (maintenance, reconnect hints).
#[derive(Debug, Deserialize)]
pub struct InfoResponse {
    pub event: String,
    pub version: Option<u64>,
    pub code: Option<i64>,
    pub msg: Option<String>,
}
