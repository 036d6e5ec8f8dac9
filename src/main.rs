use std::fs::File;
use std::sync::Mutex;

use bfxchart::config::fetch_config;
use bfxchart::tui::{restore_terminal, run, setup_terminal};
use bfxchart::{ChartError, tls};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ChartError> {
    let app_config = fetch_config()?;

    // The terminal belongs to the chart, so logs go to a file.
    let log_file = File::create(&app_config.log_file).map_err(|e| {
        ChartError::Io(format!(
            "failed to create log file {}: {e}",
            app_config.log_file.display()
        ))
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bfxchart=info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    tls::install_crypto_provider();

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &app_config).await;
    restore_terminal(&mut terminal)?;

    result
}
