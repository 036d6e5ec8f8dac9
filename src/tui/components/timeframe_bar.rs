//! Timeframe selector component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::models::Timeframe;
use crate::tui::app::App;

/// Renders the timeframe selector with its number-key shortcuts.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = Vec::new();

    for (i, timeframe) in Timeframe::ALL.iter().enumerate() {
        let style = if *timeframe == app.params.timeframe {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled(
            format!("{}", i + 1),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(format!(" {} ", timeframe.as_str()), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
