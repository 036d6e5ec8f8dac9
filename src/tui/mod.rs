//! Terminal User Interface for the candle chart.
//!
//! A single Ratatui screen: timeframe selector, status line, the chart
//! with its cross-hair legend, and a keybinding hint.

pub mod app;
pub mod chart_view;
pub mod components;
pub mod event;
pub mod runner;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Action, Event};
pub use runner::run;
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::{FeedView, render};
