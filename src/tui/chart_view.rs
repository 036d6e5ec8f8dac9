//! Candle chart rendering.
//!
//! Draws the newest candles that fit, newest on the right, one column per
//! candle. A price axis runs down the left edge and the legend line sits on
//! top.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::chart::{Legend, Trend};
use crate::models::{Candle, SeriesKind};
use crate::tui::app::App;
use crate::tui::ui::FeedView;

/// Width of the `{:>10.2} │` price axis.
const AXIS_WIDTH: u16 = 12;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Renders the chart panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App, feed: &FeedView) {
    let mut title = format!(
        " {} {} ",
        app.params.symbol,
        app.params.timeframe.as_str()
    );
    if feed.loading {
        title.push_str(&format!("{} loading ", SPINNER[(app.ticks % 10) as usize]));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if feed.series.is_empty() {
        let text = if feed.loading {
            "Waiting for snapshot..."
        } else {
            "No candle data"
        };
        let para = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    lines.push(legend_line(feed.legend.as_ref()));

    let columns = inner.width.saturating_sub(AXIS_WIDTH) as usize;
    let height = inner.height.saturating_sub(1) as usize;
    let skip = feed.series.len().saturating_sub(columns);
    let visible: Vec<&Candle> = feed.series.iter().skip(skip).collect();

    if visible.is_empty() || height == 0 {
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let (low, high) = price_range(&visible);
    let step = (high - low) / height as f64;
    let crosshair_column = app
        .crosshair
        .and_then(|time| visible.iter().position(|c| c.time == time));

    for row in 0..height {
        let level = high - step * (row as f64 + 0.5);

        let mut spans: Vec<Span> = Vec::with_capacity(visible.len() + 1);
        spans.push(Span::raw(format!("{level:>10.2} │")));

        for (column, candle) in visible.iter().enumerate() {
            let color = if candle.is_bullish() {
                Color::Green
            } else {
                Color::Red
            };
            let mut style = Style::default().fg(color);
            if crosshair_column == Some(column) {
                style = style.bg(Color::DarkGray);
            }

            let glyph = glyph(app.params.series_kind, candle, level, step / 2.0);
            spans.push(Span::styled(glyph, style));
        }

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Builds the OPEN/HIGH/LOW/CLOSE readout.
fn legend_line(legend: Option<&Legend>) -> Line<'static> {
    let Some(legend) = legend else {
        return Line::from("");
    };

    let color = match legend.trend {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", legend.title),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (label, value) in legend.fields() {
        spans.push(Span::styled(
            format!(" {label} "),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(value, Style::default().fg(color)));
    }

    Line::from(spans)
}

/// Lowest low and highest high, widened when the range is flat.
fn price_range(candles: &[&Candle]) -> (f64, f64) {
    let (low, high) = candles
        .iter()
        .fold((f64::MAX, f64::MIN), |(low, high), c| {
            (low.min(c.low), high.max(c.high))
        });

    if high - low > f64::EPSILON {
        (low, high)
    } else {
        (low - 1.0, high + 1.0)
    }
}

/// Picks the character for `candle` in the row centred on `level`.
fn glyph(kind: SeriesKind, candle: &Candle, level: f64, half_step: f64) -> &'static str {
    if level > candle.high + half_step || level < candle.low - half_step {
        return " ";
    }

    match kind {
        SeriesKind::Candlestick => {
            let body_top = candle.open.max(candle.close);
            let body_bottom = candle.open.min(candle.close);
            if level <= body_top + half_step && level >= body_bottom - half_step {
                "█"
            } else {
                "│"
            }
        }
        SeriesKind::Bar => {
            let at_open = (level - candle.open).abs() <= half_step;
            let at_close = (level - candle.close).abs() <= half_step;
            match (at_open, at_close) {
                (true, true) => "┼",
                (true, false) => "┤",
                (false, true) => "├",
                (false, false) => "│",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: 0,
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn candlestick_draws_wick_and_body() {
        let c = candle(10.0, 20.0, 0.0, 14.0);
        assert_eq!(glyph(SeriesKind::Candlestick, &c, 19.0, 0.5), "│");
        assert_eq!(glyph(SeriesKind::Candlestick, &c, 12.0, 0.5), "█");
        assert_eq!(glyph(SeriesKind::Candlestick, &c, 3.0, 0.5), "│");
        assert_eq!(glyph(SeriesKind::Candlestick, &c, 25.0, 0.5), " ");
    }

    #[test]
    fn bar_marks_open_left_and_close_right() {
        let c = candle(10.0, 20.0, 0.0, 14.0);
        assert_eq!(glyph(SeriesKind::Bar, &c, 10.0, 0.5), "┤");
        assert_eq!(glyph(SeriesKind::Bar, &c, 14.0, 0.5), "├");
        assert_eq!(glyph(SeriesKind::Bar, &c, 12.0, 0.5), "│");

        let doji = candle(10.0, 12.0, 8.0, 10.0);
        assert_eq!(glyph(SeriesKind::Bar, &doji, 10.0, 0.5), "┼");
    }

    #[test]
    fn flat_range_is_widened() {
        let c = candle(5.0, 5.0, 5.0, 5.0);
        assert_eq!(price_range(&[&c]), (4.0, 6.0));
    }
}
