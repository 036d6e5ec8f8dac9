//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::app::App;
use crate::tui::ui::FeedView;
use crate::websocket::ConnectionState;

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App, feed: &FeedView) {
    let status_color = match feed.state {
        ConnectionState::Open => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Closed | ConnectionState::Errored => Color::Red,
    };

    let error_span = match feed.last_error {
        Some(error) => Span::styled(format!(" {error} "), Style::default().fg(Color::Red)),
        None => Span::raw(""),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.params.market_label()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("│"),
        Span::styled(
            format!(" {} ", app.params.series_kind.label()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("│"),
        Span::styled(
            format!(" {} ", feed.state.label()),
            Style::default().fg(status_color),
        ),
        Span::raw("│"),
        error_span,
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
