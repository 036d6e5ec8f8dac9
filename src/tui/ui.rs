//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};

use super::app::App;
use super::chart_view;
use super::components::{status_bar, timeframe_bar};
use crate::chart::{CandleSeries, Legend};
use crate::websocket::{Connection, ConnectionState, Scheduler, Transport};

/// What the renderer needs to know about the current feed connection.
pub struct FeedView<'a> {
    pub state: ConnectionState,
    pub loading: bool,
    pub last_error: Option<&'a str>,
    pub series: &'a CandleSeries,
    /// Readout for the cross-hair candle, or the newest one without a
    /// cross-hair.
    pub legend: Option<Legend>,
}

impl<'a> FeedView<'a> {
    pub fn new<T, S>(
        connection: &'a Connection<T, CandleSeries, S>,
        crosshair: Option<i64>,
    ) -> Self
    where
        T: Transport,
        S: Scheduler,
    {
        let series = connection.sink();
        let focused = crosshair
            .and_then(|time| series.position(time))
            .and_then(|index| series.get(index))
            .or_else(|| series.last());

        Self {
            state: connection.state(),
            loading: connection.is_loading(),
            last_error: connection.last_error(),
            series,
            legend: focused.and_then(|candle| connection.legend_at(candle.time)),
        }
    }
}

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App, feed: &FeedView) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Timeframe selector
            Constraint::Length(1), // Status bar
            Constraint::Min(5),    // Chart
            Constraint::Length(1), // Keybindings help
        ])
        .split(frame.area());

    timeframe_bar::render(frame, layout[0], app);
    status_bar::render(frame, layout[1], app, feed);
    chart_view::render(frame, layout[2], app, feed);
    render_keybindings(frame, layout[3]);
}

fn render_keybindings(frame: &mut Frame, area: Rect) {
    let help = "[1-8]timeframe [s]market [g]series type [←/→]cross-hair [Esc]clear [q]quit";

    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}
