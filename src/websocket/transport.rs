//! The streaming connection underneath a [`Connection`](super::Connection).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tungstenite::Message;

use super::{ConnectionEvent, connect};
use crate::{ChartError, Result};

/// A bidirectional text-frame pipe.
pub trait Transport {
    /// Queues one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Transport`] if the transport is already gone.
    fn send(&mut self, frame: String) -> Result<()>;

    /// Starts closing. Calling it again has no effect.
    fn close(&mut self);

    /// Returns `true` while frames can actually reach the server.
    fn is_open(&self) -> bool;
}

enum Outbound {
    Text(String),
    Close,
}

/// A WebSocket driven by a background task.
///
/// Lifecycle is reported as [`ConnectionEvent`]s on the channel given to
/// [`WsTransport::open`]: `Opened`, then any number of `Frame`s, and exactly
/// one `Closed` at the end, possibly preceded by `Error`.
pub struct WsTransport {
    commands: mpsc::UnboundedSender<Outbound>,
    open: Arc<AtomicBool>,
    closing: bool,
    task: JoinHandle<()>,
}

impl WsTransport {
    /// Starts connecting to `url` and returns immediately.
    pub fn open(url: &str, events: mpsc::UnboundedSender<ConnectionEvent>) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(run_io(
            url.to_string(),
            command_rx,
            events,
            Arc::clone(&open),
        ));

        Self {
            commands,
            open,
            closing: false,
            task,
        }
    }
}

impl Transport for WsTransport {
    fn send(&mut self, frame: String) -> Result<()> {
        if self.closing {
            return Err(ChartError::Transport("transport is closing".to_string()));
        }

        self.commands
            .send(Outbound::Text(frame))
            .map_err(|_| ChartError::Transport("connection task has stopped".to_string()))
    }

    fn close(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;

        if self.open.load(Ordering::SeqCst) {
            let _ = self.commands.send(Outbound::Close);
        } else {
            // Still handshaking: nothing to close gracefully.
            self.task.abort();
        }
    }

    fn is_open(&self) -> bool {
        !self.closing && self.open.load(Ordering::SeqCst)
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Connects, then pumps frames both ways until either side closes.
async fn run_io(
    url: String,
    mut commands: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    open: Arc<AtomicBool>,
) {
    let (mut write, mut read) = match connect(&url).await {
        Ok(pair) => pair,
        Err(e) => {
            error!(%url, "Connection failed: {e}");
            let _ = events.send(ConnectionEvent::Error(e.to_string()));
            let _ = events.send(ConnectionEvent::Closed);
            return;
        }
    };

    open.store(true, Ordering::SeqCst);
    let _ = events.send(ConnectionEvent::Opened);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        warn!("WebSocket send failed: {e}");
                        let _ = events.send(ConnectionEvent::Error(e.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    open.store(false, Ordering::SeqCst);
                    if let Err(e) = write.close().await {
                        debug!("WebSocket close handshake failed: {e}");
                    }
                    info!("WebSocket closed by client");
                    break;
                }
            },

            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if events.send(ConnectionEvent::Frame(text.to_string())).is_err() {
                        // Nobody listens any more.
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(?frame, "WebSocket closed by server");
                    break;
                }
                Some(Ok(_)) => {} // Binary/Ping/Pong frames
                Some(Err(e)) => {
                    warn!("WebSocket error: {e}");
                    let _ = events.send(ConnectionEvent::Error(e.to_string()));
                    break;
                }
                None => {
                    warn!("WebSocket stream ended");
                    break;
                }
            }
        }
    }

    open.store(false, Ordering::SeqCst);
    let _ = events.send(ConnectionEvent::Closed);
}
