// Host bridge for the print station: reads requests on stdin, answers on stdout.

use std::io;
use tracing::{error, info};

use print_station::commands;
use print_station::{App, AppResult, Config};

fn run() -> AppResult<()> {
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    let app = App::new(config);
    info!("Source root: {:?}", app.config().root_path());
    info!("Printer path: {:?}", app.config().printer_path());
    let stdin = io::stdin();
    let stdout = io::stdout();

    info!("System ready for operation");
    commands::serve(&app, stdin.lock(), stdout.lock())?;
    Ok(())
}

fn main() -> AppResult<()> {
    // Logs go to stderr; stdout carries replies
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting print station");

    run().map_err(|e| {
        error!("Print station stopped: {}", e);
        e
    })
}
