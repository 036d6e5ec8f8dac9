//! The terminal app's event loop.
//!
//! One task owns the [`App`] and the live connection. UI input and feed
//! events are consumed from two channels by a single `select!`, so the
//! connection only ever sees one event at a time.

use tokio::sync::mpsc;
use tracing::info;

use super::app::App;
use super::event::{Action, spawn_event_reader, spawn_tick_timer, update};
use super::terminal::Tui;
use super::ui::{FeedView, render};
use crate::config::AppConfig;
use crate::models::SubscriptionParams;
use crate::storage::{self, FileStore, PREFERENCES_KEY};
use crate::websocket::open_live;
use crate::{ChartError, Result};

/// Interval between UI ticks, which animate the loading spinner.
const TICK_INTERVAL_MS: u64 = 250;

/// Runs the chart until the user quits.
///
/// Starts from the persisted preferences (or the defaults) and replaces the
/// feed connection whenever the subscription parameters change.
///
/// # Errors
///
/// Returns [`ChartError::Io`] if drawing to the terminal fails.
pub async fn run(terminal: &mut Tui, config: &AppConfig) -> Result<()> {
    let store = FileStore::new(&config.preferences_path);
    let params: SubscriptionParams =
        storage::load(&store, PREFERENCES_KEY).unwrap_or_default();
    let mut app = App::new(params);

    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
    spawn_event_reader(ui_tx.clone());
    spawn_tick_timer(ui_tx, TICK_INTERVAL_MS);

    info!(key = %app.params.key(), "Opening feed");
    let (mut connection, mut feed_rx) =
        open_live(&config.feed, app.params.clone(), Box::new(store.clone()));

    loop {
        terminal
            .draw(|frame| {
                let feed = FeedView::new(&connection, app.crosshair);
                render(frame, &app, &feed);
            })
            .map_err(|e| ChartError::Io(e.to_string()))?;

        tokio::select! {
            Some(event) = ui_rx.recv() => {
                if let Some(Action::Resubscribe) = update(&mut app, event, connection.sink()) {
                    info!(key = %app.params.key(), "Subscription changed, reopening feed");
                    connection.teardown();
                    (connection, feed_rx) =
                        open_live(&config.feed, app.params.clone(), Box::new(store.clone()));
                }
            }
            Some(event) = feed_rx.recv() => connection.dispatch(event),
            else => break,
        }

        if app.should_quit {
            break;
        }
    }

    connection.teardown();
    Ok(())
}
