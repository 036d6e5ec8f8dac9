//! Terminal setup and teardown utilities.

use std::io::{self, IsTerminal, Stdout};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{ChartError, Result};

/// Type alias for our terminal backend.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Switches the terminal to raw mode on the alternate screen.
///
/// # Errors
///
/// Returns [`ChartError::Io`] if stdout is not a TTY or the terminal
/// refuses either mode.
pub fn setup_terminal() -> Result<Tui> {
    if !io::stdout().is_terminal() {
        return Err(ChartError::Io(
            "the chart needs an interactive terminal (TTY)".to_string(),
        ));
    }

    enable_raw_mode().map_err(|e| ChartError::Io(format!("failed to enable raw mode: {e}")))?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(ChartError::Io(format!(
            "failed to enter alternate screen: {e}"
        )));
    }

    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| {
        let _ = disable_raw_mode();
        ChartError::Io(format!("failed to create terminal: {e}"))
    })
}

/// Leaves the alternate screen and raw mode.
///
/// # Errors
///
/// Returns [`ChartError::Io`] if terminal restoration fails.
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().map_err(|e| ChartError::Io(e.to_string()))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| ChartError::Io(e.to_string()))?;
    terminal
        .show_cursor()
        .map_err(|e| ChartError::Io(e.to_string()))
}
