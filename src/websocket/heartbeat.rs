//! Application-level ping/pong liveness.
//!
//! The feed exposes no transport keepalive to the client, so a
//! [`HeartbeatSupervisor`] pings on a fixed period and gives the session a
//! deadline that only a pong can push back. When the deadline passes the
//! supervisor asks for the connection to be closed; nothing is retried.

use tracing::{debug, trace, warn};

use super::scheduler::{Scheduler, TimerFired, TimerHandle, TimerKind};
use crate::config::HeartbeatConfig;

/// Lifecycle of the supervisor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeartbeatState {
    #[default]
    Idle,
    Armed,
    Expired,
}

/// What the owner of the connection has to do after a timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartbeatAction {
    Nothing,
    SendPing,
    ForceClose,
}

/// Owns the ping and pong-deadline timers of one connection.
#[derive(Debug)]
pub struct HeartbeatSupervisor {
    config: HeartbeatConfig,
    state: HeartbeatState,
    ping_timer: Option<TimerHandle>,
    deadline_timer: Option<TimerHandle>,
}

impl HeartbeatSupervisor {
    pub fn new(config: HeartbeatConfig) -> Self {
        Self {
            config,
            state: HeartbeatState::Idle,
            ping_timer: None,
            deadline_timer: None,
        }
    }

    pub fn state(&self) -> HeartbeatState {
        self.state
    }

    /// Starts pinging and arms the first pong deadline. Only valid from `Idle`.
    pub fn start<S: Scheduler>(&mut self, scheduler: &mut S) {
        if self.state != HeartbeatState::Idle {
            warn!(state = ?self.state, "Heartbeat already started");
            return;
        }

        self.ping_timer = Some(scheduler.start(TimerKind::Ping, self.config.ping_interval));
        self.rearm_deadline(scheduler);
        self.state = HeartbeatState::Armed;
        debug!(
            ping_secs = self.config.ping_interval.as_secs(),
            timeout_secs = self.config.pong_timeout.as_secs(),
            "Heartbeat started"
        );
    }

    /// Pushes the deadline back by a full timeout.
    pub fn on_pong<S: Scheduler>(&mut self, scheduler: &mut S) {
        if self.state != HeartbeatState::Armed {
            debug!(state = ?self.state, "Pong outside of an armed heartbeat");
            return;
        }

        self.rearm_deadline(scheduler);
        trace!("Pong received, deadline re-armed");
    }

    /// Handles a fired timer.
    ///
    /// `transport_open` gates the ping: a ping due while the transport is
    /// not open is skipped, not queued. Fires of timers that were cancelled
    /// or replaced are ignored.
    pub fn on_timer<S: Scheduler>(
        &mut self,
        fired: TimerFired,
        scheduler: &mut S,
        transport_open: bool,
    ) -> HeartbeatAction {
        if self.state != HeartbeatState::Armed {
            return HeartbeatAction::Nothing;
        }

        match fired.kind {
            TimerKind::Ping if self.ping_timer == Some(fired.handle) => {
                self.ping_timer = Some(scheduler.start(TimerKind::Ping, self.config.ping_interval));
                if transport_open {
                    HeartbeatAction::SendPing
                } else {
                    debug!("Transport not open, ping skipped");
                    HeartbeatAction::Nothing
                }
            }
            TimerKind::PongDeadline if self.deadline_timer == Some(fired.handle) => {
                self.deadline_timer = None;
                if let Some(handle) = self.ping_timer.take() {
                    scheduler.cancel(handle);
                }
                self.state = HeartbeatState::Expired;
                warn!(
                    timeout_secs = self.config.pong_timeout.as_secs(),
                    "No pong received in time"
                );
                HeartbeatAction::ForceClose
            }
            _ => {
                trace!(?fired, "Stale timer ignored");
                HeartbeatAction::Nothing
            }
        }
    }

    /// Cancels both timers and returns to `Idle`. Safe from any state.
    pub fn stop<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.ping_timer.take() {
            scheduler.cancel(handle);
        }
        if let Some(handle) = self.deadline_timer.take() {
            scheduler.cancel(handle);
        }
        if self.state != HeartbeatState::Idle {
            debug!("Heartbeat stopped");
        }
        self.state = HeartbeatState::Idle;
    }

    /// Cancel-then-rearm, so at most one deadline is ever pending.
    fn rearm_deadline<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.deadline_timer.take() {
            scheduler.cancel(handle);
        }
        self.deadline_timer =
            Some(scheduler.start(TimerKind::PongDeadline, self.config.pong_timeout));
    }
}
