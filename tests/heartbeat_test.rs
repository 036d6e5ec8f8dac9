//! Heartbeat supervisor and scheduler tests.

use std::time::Duration;

use bfxchart::config::HeartbeatConfig;
use bfxchart::websocket::{
    HeartbeatAction, HeartbeatState, HeartbeatSupervisor, ManualScheduler, Scheduler, TimerFired,
    TimerKind, TokioScheduler,
};
use tokio::sync::mpsc;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

/// Runs every timer due up to `until`, collecting the supervisor's answers.
fn run_until(
    supervisor: &mut HeartbeatSupervisor,
    scheduler: &mut ManualScheduler,
    until: Duration,
) -> Vec<HeartbeatAction> {
    let mut actions = Vec::new();
    while let Some(fired) = scheduler.fire_next(until) {
        actions.push(supervisor.on_timer(fired, scheduler, true));
    }
    actions
}

#[test]
fn test_start_arms_ping_and_deadline() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());

    supervisor.start(&mut scheduler);

    assert_eq!(supervisor.state(), HeartbeatState::Armed);
    assert_eq!(scheduler.pending(), 2);
    assert!(scheduler.is_armed(TimerKind::Ping));
    assert!(scheduler.is_armed(TimerKind::PongDeadline));
}

#[test]
fn test_start_twice_does_not_duplicate_timers() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());

    supervisor.start(&mut scheduler);
    supervisor.start(&mut scheduler);

    assert_eq!(scheduler.pending(), 2);
}

#[test]
fn test_pings_every_interval() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());
    supervisor.start(&mut scheduler);

    let actions = run_until(&mut supervisor, &mut scheduler, secs(59));

    assert_eq!(actions, vec![HeartbeatAction::SendPing]);
    assert_eq!(scheduler.now(), secs(59));
}

#[test]
fn test_expires_exactly_once_without_pong() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());
    supervisor.start(&mut scheduler);

    let actions = run_until(&mut supervisor, &mut scheduler, secs(600));

    let closes = actions
        .iter()
        .filter(|a| **a == HeartbeatAction::ForceClose)
        .count();
    assert_eq!(closes, 1);
    assert_eq!(supervisor.state(), HeartbeatState::Expired);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_pong_pushes_deadline_back() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());
    supervisor.start(&mut scheduler);

    let mut t = 0;
    while t < 3600 {
        t += 59;
        let actions = run_until(&mut supervisor, &mut scheduler, secs(t));
        assert!(!actions.contains(&HeartbeatAction::ForceClose));
        supervisor.on_pong(&mut scheduler);
    }

    assert_eq!(supervisor.state(), HeartbeatState::Armed);
    // One ping, one deadline: re-arming never stacks deadlines.
    assert_eq!(scheduler.pending(), 2);
}

#[test]
fn test_pong_outside_armed_is_ignored() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());

    supervisor.on_pong(&mut scheduler);

    assert_eq!(supervisor.state(), HeartbeatState::Idle);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_ping_skipped_when_transport_closed() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());
    supervisor.start(&mut scheduler);

    let fired = scheduler.fire_next(secs(30)).unwrap();
    assert_eq!(fired.kind, TimerKind::Ping);

    let action = supervisor.on_timer(fired, &mut scheduler, false);

    assert_eq!(action, HeartbeatAction::Nothing);
    assert!(scheduler.is_armed(TimerKind::Ping));
}

#[test]
fn test_stale_timer_is_ignored() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());
    supervisor.start(&mut scheduler);

    // Handles are issued in order, so the reference scheduler's second handle is the
    // first deadline the supervisor armed.
    let mut reference = ManualScheduler::new();
    reference.start(TimerKind::Ping, secs(0));
    let stale = TimerFired {
        handle: reference.start(TimerKind::PongDeadline, secs(0)),
        kind: TimerKind::PongDeadline,
    };
    supervisor.on_pong(&mut scheduler);

    let action = supervisor.on_timer(stale, &mut scheduler, true);

    assert_eq!(action, HeartbeatAction::Nothing);
    assert_eq!(supervisor.state(), HeartbeatState::Armed);
}

#[test]
fn test_stop_cancels_everything() {
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(HeartbeatConfig::default());
    supervisor.start(&mut scheduler);

    supervisor.stop(&mut scheduler);
    supervisor.stop(&mut scheduler);

    assert_eq!(supervisor.state(), HeartbeatState::Idle);
    assert_eq!(scheduler.pending(), 0);
    assert!(run_until(&mut supervisor, &mut scheduler, secs(600)).is_empty());
}

#[test]
fn test_custom_intervals() {
    let config = HeartbeatConfig {
        ping_interval: secs(5),
        pong_timeout: secs(12),
    };
    let mut scheduler = ManualScheduler::new();
    let mut supervisor = HeartbeatSupervisor::new(config);
    supervisor.start(&mut scheduler);

    let actions = run_until(&mut supervisor, &mut scheduler, secs(12));

    assert_eq!(
        actions,
        vec![
            HeartbeatAction::SendPing,
            HeartbeatAction::SendPing,
            HeartbeatAction::ForceClose,
        ]
    );
}

#[test]
fn test_manual_scheduler_fires_ties_in_start_order() {
    let mut scheduler = ManualScheduler::new();
    let first = scheduler.start(TimerKind::PongDeadline, secs(10));
    let second = scheduler.start(TimerKind::Ping, secs(10));

    assert_eq!(scheduler.fire_next(secs(10)).map(|f| f.handle), Some(first));
    assert_eq!(scheduler.fire_next(secs(10)).map(|f| f.handle), Some(second));
    assert_eq!(scheduler.fire_next(secs(10)), None);
}

#[tokio::test(start_paused = true)]
async fn test_tokio_scheduler_delivers_fires() {
    let (tx, mut rx) = mpsc::unbounded_channel::<TimerFired>();
    let mut scheduler = TokioScheduler::new(tx);

    let handle = scheduler.start(TimerKind::Ping, secs(30));
    let fired = rx.recv().await.unwrap();

    assert_eq!(fired.handle, handle);
    assert_eq!(fired.kind, TimerKind::Ping);
}

#[tokio::test(start_paused = true)]
async fn test_tokio_scheduler_cancel_suppresses_fire() {
    let (tx, mut rx) = mpsc::unbounded_channel::<TimerFired>();
    let mut scheduler = TokioScheduler::new(tx);

    let cancelled = scheduler.start(TimerKind::PongDeadline, secs(10));
    let kept = scheduler.start(TimerKind::Ping, secs(20));
    scheduler.cancel(cancelled);

    let fired = rx.recv().await.unwrap();
    assert_eq!(fired.handle, kept);

    tokio::time::sleep(secs(60)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(scheduler.pending(), 0);
}
