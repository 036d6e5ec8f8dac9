//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

use super::app::App;
use crate::chart::CandleSeries;
use crate::models::Timeframe;

/// Events that can occur in the application.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
}

/// Actions that must be handled outside the UI state.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Subscription parameters changed: replace the feed connection.
    Resubscribe,
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        loop {
            // Poll for events with a 50ms timeout
            match tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await
            {
                Ok(Some(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                    if tx.send(Event::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(w, h))) => {
                    if tx.send(Event::Resize(w, h)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Event>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Event::Tick).is_err() {
                break;
            }
        }
    });
}

/// Updates application state based on an event.
///
/// `series` is what the cross-hair moves over.
pub fn update(app: &mut App, event: Event, series: &CandleSeries) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key(app, key, series),
        Event::Resize(_, _) => None,
        Event::Tick => {
            app.ticks = app.ticks.wrapping_add(1);
            None
        }
    }
}

/// Handles key press events.
fn handle_key(app: &mut App, key: KeyEvent, series: &CandleSeries) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') if key.modifiers.is_empty() => {
            app.should_quit = true;
            None
        }

        // Timeframe shortcuts 1..8
        KeyCode::Char(c @ '1'..='8') => {
            let timeframe = Timeframe::from_shortcut(c)?;
            app.select_timeframe(timeframe).then_some(Action::Resubscribe)
        }

        KeyCode::Char('s') => {
            app.next_market();
            Some(Action::Resubscribe)
        }
        KeyCode::Char('g') => {
            app.toggle_series();
            Some(Action::Resubscribe)
        }

        // Cross-hair
        KeyCode::Char('h') | KeyCode::Left => {
            app.crosshair_back(series);
            None
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.crosshair_forward(series);
            None
        }
        KeyCode::Esc => {
            app.clear_crosshair();
            None
        }

        _ => None,
    }
}
