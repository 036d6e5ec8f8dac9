//! Classification of inbound feed frames.
//!
//! [`classify`] never fails: anything that is not JSON comes back as
//! [`FeedMessage::Malformed`], anything of an unknown shape as
//! [`FeedMessage::Ignored`].

use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::models::{ErrorResponse, InfoResponse, PongResponse, RawTick, SubscribedResponse};

/// Literal second element of a heartbeat frame.
const HEARTBEAT_MARKER: &str = "hb";

/// Protocol `event` objects the connection reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Reply to our ping.
    Pong,
    /// Subscription acknowledged; data frames will carry `chan_id`.
    Subscribed { chan_id: u64, key: Option<String> },
    /// The server refused a request.
    Error { code: Option<i64>, msg: Option<String> },
    /// Greeting or platform notice.
    Info {
        version: Option<u64>,
        code: Option<i64>,
        msg: Option<String>,
    },
}

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Event(FeedEvent),
    /// Channel keep-alive marker. Carries no data.
    Heartbeat { channel_id: Option<u64> },
    /// Bulk history, in whatever order the feed sent it.
    Snapshot {
        channel_id: Option<u64>,
        ticks: Vec<RawTick>,
    },
    /// A single live tick.
    Update {
        channel_id: Option<u64>,
        tick: RawTick,
    },
    /// Valid JSON of no interest (acks for other events, unknown arrays).
    Ignored,
    /// Not JSON, or a data frame whose tuple cannot be read.
    Malformed(String),
}

/// Classifies one text frame.
pub fn classify(frame: &str) -> FeedMessage {
    let value: Value = match serde_json::from_str(frame) {
        Ok(value) => value,
        Err(e) => return FeedMessage::Malformed(e.to_string()),
    };

    match value {
        Value::Object(map) => classify_event(map),
        Value::Array(items) => classify_channel(&items),
        _ => FeedMessage::Ignored,
    }
}

/// Routes `{"event": ...}` objects.
fn classify_event(map: Map<String, Value>) -> FeedMessage {
    let Some(event) = map.get("event").and_then(Value::as_str).map(String::from) else {
        return FeedMessage::Ignored;
    };
    let value = Value::Object(map);

    let event = match event.as_str() {
        "pong" => serde_json::from_value::<PongResponse>(value)
            .ok()
            .map(|r| {
                trace!(ts = ?r.ts, "Pong");
                FeedEvent::Pong
            }),
        "subscribed" => serde_json::from_value::<SubscribedResponse>(value)
            .ok()
            .map(|r| FeedEvent::Subscribed {
                chan_id: r.chan_id,
                key: r.key,
            }),
        "error" => serde_json::from_value::<ErrorResponse>(value)
            .ok()
            .map(|r| FeedEvent::Error {
                code: r.code,
                msg: r.msg,
            }),
        "info" => serde_json::from_value::<InfoResponse>(value)
            .ok()
            .map(|r| FeedEvent::Info {
                version: r.version,
                code: r.code,
                msg: r.msg,
            }),
        _ => None,
    };

    event.map_or(FeedMessage::Ignored, FeedMessage::Event)
}

/// Routes `[chan_id, payload]` arrays.
fn classify_channel(items: &[Value]) -> FeedMessage {
    let channel_id = items.first().and_then(Value::as_u64);

    match items.get(1) {
        Some(Value::String(marker)) if marker == HEARTBEAT_MARKER => {
            FeedMessage::Heartbeat { channel_id }
        }
        // One tuple is enough to make it a snapshot; the rest are read
        // entry by entry.
        Some(Value::Array(payload))
            if payload.is_empty() || payload.iter().any(Value::is_array) =>
        {
            FeedMessage::Snapshot {
                channel_id,
                ticks: snapshot_ticks(payload),
            }
        }
        Some(Value::Array(payload)) => match RawTick::from_values(payload) {
            Some(tick) => FeedMessage::Update { channel_id, tick },
            None if payload.len() < RawTick::FIELDS => FeedMessage::Malformed(format!(
                "update tuple needs {} numbers, got {}",
                RawTick::FIELDS,
                payload.len()
            )),
            None => FeedMessage::Malformed(format!(
                "update tuple has non-numeric fields: {}",
                Value::Array(payload.to_vec())
            )),
        },
        _ => FeedMessage::Ignored,
    }
}

/// Reads every tuple of a snapshot, skipping the ones that are not ticks.
fn snapshot_ticks(payload: &[Value]) -> Vec<RawTick> {
    let ticks: Vec<RawTick> = payload
        .iter()
        .filter_map(|entry| entry.as_array().and_then(|t| RawTick::from_values(t)))
        .collect();

    if ticks.len() < payload.len() {
        warn!(
            dropped = payload.len() - ticks.len(),
            "Skipped unreadable snapshot entries"
        );
    }

    ticks
}
