//! Reusable UI components.

pub mod status_bar;
pub mod timeframe_bar;
