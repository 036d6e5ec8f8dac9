//! Feed connection lifecycle.
//!
//! A [`Connection`] is one subscription's worth of state: it sends the
//! subscribe request once the transport opens, runs the heartbeat, turns
//! data frames into chart updates and tracks the loading flag the UI shows.
//! All input arrives through [`Connection::dispatch`], one event at a time.
//! Nothing here reconnects; a new set of subscription parameters gets a
//! new `Connection`.

use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use super::codec::{FeedEvent, FeedMessage, classify};
use super::heartbeat::{HeartbeatAction, HeartbeatSupervisor};
use super::scheduler::{Scheduler, TimerFired};
use super::transport::Transport;
use crate::chart::{ChartSink, ChartSinkAdapter, Legend, normalize_one, normalize_snapshot};
use crate::config::HeartbeatConfig;
use crate::models::{PingRequest, RawTick, SubscribeRequest, SubscriptionParams};
use crate::storage::{self, PREFERENCES_KEY, PreferenceStore};

/// Where a connection is in its life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    /// Returns a display string for the state.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Open => "Live",
            ConnectionState::Closed => "Closed",
            ConnectionState::Errored => "Error",
        }
    }
}

/// Everything that can happen to a connection.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionEvent {
    /// The transport finished its handshake.
    Opened,
    /// One inbound text frame.
    Frame(String),
    /// The transport failed.
    Error(String),
    /// The transport is closed, for whatever reason.
    Closed,
    /// A heartbeat timer elapsed.
    Timer(TimerFired),
}

impl From<TimerFired> for ConnectionEvent {
    fn from(fired: TimerFired) -> Self {
        ConnectionEvent::Timer(fired)
    }
}

/// One live chart subscription.
pub struct Connection<T, K, S>
where
    T: Transport,
    K: ChartSink,
    S: Scheduler,
{
    params: SubscriptionParams,
    state: ConnectionState,
    loading: bool,
    last_error: Option<String>,
    channel_id: Option<u64>,
    detached: bool,
    transport: T,
    chart: ChartSinkAdapter<K>,
    heartbeat: HeartbeatSupervisor,
    scheduler: S,
    preferences: Box<dyn PreferenceStore>,
}

impl<T, K, S> Connection<T, K, S>
where
    T: Transport,
    K: ChartSink,
    S: Scheduler,
{
    /// Wraps a transport that has just started connecting.
    pub fn new(
        params: SubscriptionParams,
        transport: T,
        sink: K,
        scheduler: S,
        preferences: Box<dyn PreferenceStore>,
        heartbeat: HeartbeatConfig,
    ) -> Self {
        info!(key = %params.key(), "Connecting to feed");

        Self {
            params,
            state: ConnectionState::Connecting,
            loading: true,
            last_error: None,
            channel_id: None,
            detached: false,
            transport,
            chart: ChartSinkAdapter::new(sink),
            heartbeat: HeartbeatSupervisor::new(heartbeat),
            scheduler,
            preferences,
        }
    }

    pub fn params(&self) -> &SubscriptionParams {
        &self.params
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// `true` until the first snapshot is applied or the transport fails.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Most recent transport failure, for display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The chart surface this connection writes to.
    pub fn sink(&self) -> &K {
        self.chart.sink()
    }

    /// Cross-hair readout for the candle at `time`.
    pub fn legend_at(&self, time: i64) -> Option<Legend> {
        let title = format!("{} {}", self.params.symbol, self.params.timeframe.as_str());
        self.chart.legend_at(&title, time)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn heartbeat(&self) -> &HeartbeatSupervisor {
        &self.heartbeat
    }

    /// Returns `true` after [`Connection::teardown`].
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Single entry point for transport and timer events.
    pub fn dispatch(&mut self, event: ConnectionEvent) {
        if self.detached {
            trace!(?event, "Event after teardown ignored");
            return;
        }

        match (self.state, event) {
            (ConnectionState::Connecting, ConnectionEvent::Opened) => self.on_open(),
            (ConnectionState::Open, ConnectionEvent::Frame(text)) => self.on_frame(&text),
            (ConnectionState::Closed, ConnectionEvent::Error(reason)) => {
                debug!(%reason, "Transport error after close ignored");
            }
            (_, ConnectionEvent::Error(reason)) => self.on_error(reason),
            (_, ConnectionEvent::Closed) => self.on_close(),
            (_, ConnectionEvent::Timer(fired)) => self.on_timer(fired),
            (state, event) => debug!(?state, ?event, "Event ignored in current state"),
        }
    }

    /// Closes the transport, stops the heartbeat and detaches from any
    /// further events. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.detached {
            return;
        }

        self.transport.close();
        self.on_close();
        self.detached = true;
        debug!(key = %self.params.key(), "Connection torn down");
    }

    fn on_open(&mut self) {
        let request = SubscribeRequest::candles(&self.params);
        self.send_json(&request);
        info!(key = %request.key, "Subscribed to candles");

        self.heartbeat.start(&mut self.scheduler);
        storage::save(self.preferences.as_mut(), PREFERENCES_KEY, &self.params);
        self.state = ConnectionState::Open;
    }

    fn on_frame(&mut self, text: &str) {
        match classify(text) {
            FeedMessage::Event(event) => self.on_event(event),
            FeedMessage::Heartbeat { .. } => {
                // Only a pong proves the session is alive.
                trace!("Heartbeat");
            }
            FeedMessage::Snapshot { channel_id, ticks } => {
                if self.is_foreign(channel_id) {
                    return;
                }
                self.apply_snapshot(&ticks);
            }
            FeedMessage::Update { channel_id, tick } => {
                if self.is_foreign(channel_id) {
                    return;
                }
                self.apply_update(&tick);
            }
            FeedMessage::Malformed(reason) => warn!(%reason, "Dropped malformed frame"),
            FeedMessage::Ignored => trace!(frame = text, "Ignored frame"),
        }
    }

    fn on_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Pong => self.heartbeat.on_pong(&mut self.scheduler),
            FeedEvent::Subscribed { chan_id, key } => {
                info!(chan_id, ?key, "Subscription confirmed");
                self.channel_id = Some(chan_id);
            }
            FeedEvent::Error { code, msg } => {
                warn!(?code, ?msg, "Feed reported an error");
            }
            FeedEvent::Info { version, code, msg } => {
                info!(?version, ?code, ?msg, "Feed info");
            }
        }
    }

    fn apply_snapshot(&mut self, ticks: &[RawTick]) {
        let candles = normalize_snapshot(ticks);
        let count = candles.len();

        match self.chart.set_data(candles) {
            Ok(()) => {
                self.loading = false;
                info!(candles = count, "Snapshot applied");
            }
            Err(e) => error!("Chart rejected snapshot: {e}"),
        }
    }

    fn apply_update(&mut self, tick: &RawTick) {
        let candle = normalize_one(tick);
        if let Err(e) = self.chart.update(candle) {
            warn!(time = candle.time, "Dropped chart update: {e}");
        }
    }

    fn on_error(&mut self, reason: String) {
        warn!(%reason, "Transport error");
        self.state = ConnectionState::Errored;
        self.loading = false;
        self.last_error = Some(reason);
    }

    fn on_close(&mut self) {
        self.heartbeat.stop(&mut self.scheduler);
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;
        info!(key = %self.params.key(), "Connection closed");
    }

    fn on_timer(&mut self, fired: TimerFired) {
        let transport_open = self.transport.is_open();
        match self
            .heartbeat
            .on_timer(fired, &mut self.scheduler, transport_open)
        {
            HeartbeatAction::SendPing => {
                self.send_json(&PingRequest::new());
                debug!("Sent ping");
            }
            HeartbeatAction::ForceClose => {
                self.transport.close();
                self.on_close();
            }
            HeartbeatAction::Nothing => {}
        }
    }

    /// Data for a channel other than the confirmed one.
    fn is_foreign(&self, channel_id: Option<u64>) -> bool {
        match (self.channel_id, channel_id) {
            (Some(ours), Some(theirs)) if ours != theirs => {
                debug!(ours, theirs, "Frame for another channel dropped");
                true
            }
            _ => false,
        }
    }

    fn send_json<M: Serialize>(&mut self, message: &M) {
        let result = serde_json::to_string(message)
            .map_err(crate::ChartError::from)
            .and_then(|json| self.transport.send(json));

        if let Err(e) = result {
            error!("Failed to send frame: {e}");
        }
    }
}

impl<T, K, S> Drop for Connection<T, K, S>
where
    T: Transport,
    K: ChartSink,
    S: Scheduler,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
