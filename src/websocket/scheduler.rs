//! One-shot timers behind a small trait, so timing-driven code can run
//! against a virtual clock in tests.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Identifies one armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What a timer is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Time to send the next ping.
    Ping,
    /// No pong arrived in time.
    PongDeadline,
}

/// Delivered when a timer elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerFired {
    pub handle: TimerHandle,
    pub kind: TimerKind,
}

/// Starts and cancels one-shot timers.
pub trait Scheduler {
    /// Arms a timer that fires once after `delay`.
    fn start(&mut self, kind: TimerKind, delay: Duration) -> TimerHandle;

    /// Disarms a timer. Cancelling a fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Runs each timer as a sleeping tokio task that reports back over a channel.
///
/// Fires are converted into `E`, so they can share a channel with other
/// events of the same consumer. Dropping the scheduler aborts every timer.
pub struct TokioScheduler<E> {
    next_id: u64,
    tx: mpsc::UnboundedSender<E>,
    timers: HashMap<TimerHandle, JoinHandle<()>>,
}

impl<E> TokioScheduler<E>
where
    E: From<TimerFired> + Send + 'static,
{
    pub fn new(tx: mpsc::UnboundedSender<E>) -> Self {
        Self {
            next_id: 0,
            tx,
            timers: HashMap::new(),
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|t| !t.is_finished()).count()
    }
}

impl<E> Scheduler for TokioScheduler<E>
where
    E: From<TimerFired> + Send + 'static,
{
    fn start(&mut self, kind: TimerKind, delay: Duration) -> TimerHandle {
        self.timers.retain(|_, task| !task.is_finished());

        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(E::from(TimerFired { handle, kind }));
        });
        self.timers.insert(handle, task);
        trace!(?handle, ?kind, ?delay, "Timer armed");

        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.timers.remove(&handle) {
            task.abort();
            trace!(?handle, "Timer cancelled");
        }
    }
}

impl<E> Drop for TokioScheduler<E> {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}

/// Virtual-clock scheduler. Nothing fires until the owner asks.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TimerFired)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if a timer of `kind` is armed.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|(_, fired)| fired.kind == kind)
    }

    /// Pops the earliest timer due at or before `until` and moves the clock
    /// to its deadline. When nothing is due the clock moves to `until` and
    /// `None` is returned.
    ///
    /// Ties fire in the order the timers were started.
    pub fn fire_next(&mut self, until: Duration) -> Option<TimerFired> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (deadline, _))| *deadline <= until)
            .min_by_key(|(i, (deadline, _))| (*deadline, *i))
            .map(|(i, _)| i);

        match index {
            Some(i) => {
                let (deadline, fired) = self.pending.remove(i);
                self.now = self.now.max(deadline);
                Some(fired)
            }
            None => {
                self.now = self.now.max(until);
                None
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, kind: TimerKind, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending
            .push((self.now + delay, TimerFired { handle, kind }));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(_, fired)| fired.handle != handle);
    }
}
