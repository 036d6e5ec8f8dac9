//! Async client for the Bitfinex WebSocket v2 candles feed.
//!
//! This module is organized by concern:
//! - [`codec`] - Inbound frame classification
//! - [`heartbeat`] - Ping/pong liveness supervision
//! - [`scheduler`] - Timers, real and virtual
//! - [`transport`] - The socket and its I/O task
//! - [`connection`] - The per-subscription state machine tying them together

pub mod codec;
pub mod connection;
pub mod heartbeat;
pub mod scheduler;
pub mod transport;

use futures_util::StreamExt;
use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::info;
use tungstenite::Message;

use crate::Result;

pub use codec::{FeedEvent, FeedMessage, classify};
pub use connection::{Connection, ConnectionEvent, ConnectionState};
pub use heartbeat::{HeartbeatAction, HeartbeatState, HeartbeatSupervisor};
pub use scheduler::{ManualScheduler, Scheduler, TimerFired, TimerHandle, TimerKind, TokioScheduler};
pub use transport::{Transport, WsTransport};

/// Write half of a feed WebSocket connection.
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of a feed WebSocket connection.
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// The connection type the terminal app runs.
pub type LiveConnection =
    Connection<WsTransport, crate::chart::CandleSeries, TokioScheduler<ConnectionEvent>>;

/// Establishes a WebSocket connection to the given URL.
///
/// # Errors
///
/// Returns a [`ChartError`](crate::ChartError) if the connection or TLS handshake fails.
pub async fn connect(url: &str) -> Result<(WsWriter, WsReader)> {
    let (ws_stream, _) = connect_async(url).await?;
    info!(%url, "WebSocket handshake completed");

    Ok(ws_stream.split())
}

/// Starts a live connection for `params`.
///
/// Returns immediately; transport and timer events for the new connection
/// arrive on the returned receiver and must be fed to
/// [`Connection::dispatch`]. Dropping the receiver detaches them.
pub fn open_live(
    feed: &crate::config::FeedConfig,
    params: crate::models::SubscriptionParams,
    preferences: Box<dyn crate::storage::PreferenceStore>,
) -> (
    LiveConnection,
    tokio::sync::mpsc::UnboundedReceiver<ConnectionEvent>,
) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let transport = WsTransport::open(&feed.websocket_url, tx.clone());
    let scheduler = TokioScheduler::new(tx);

    let connection = Connection::new(
        params,
        transport,
        crate::chart::CandleSeries::new(),
        scheduler,
        preferences,
        feed.heartbeat,
    );

    (connection, rx)
}
