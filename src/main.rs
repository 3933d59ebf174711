//! transitboard - Live GO Transit and TTC service dashboard
//!
//! A terminal UI application that displays network performance, line and route
//! statistics, vehicle positions and service alerts, refreshing them periodically.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use transitboard::app::App;
use transitboard::cli::{Cli, StartupConfig};
use transitboard::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        error!(event = "app.panic", message = %panic_info);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

async fn run(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(&config)?;

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial render shows every section loading
    terminal.draw(|f| ui::render(f, &app))?;
    app.load_all_data().await;

    // Main event loop
    let result = loop {
        if let Err(e) = terminal.draw(|f| ui::render(f, &app)) {
            break Err(e);
        }

        // Poll for keyboard events with 100ms timeout
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        if app.should_quit {
            break Ok(());
        }

        if app.poll(Utc::now()) {
            // Redraw before the network round trip
            if let Err(e) = terminal.draw(|f| ui::render(f, &app)) {
                break Err(e);
            }
            app.load_all_data().await;
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result.map_err(Into::into)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Bad flags are reported before the terminal is taken over
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    match logging::init_logging(config.log_file.as_deref()) {
        Ok(Some(path)) => info!(event = "app.started", log_file = %path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("error: could not open log file: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match run(config).await {
        Ok(()) => {
            info!(event = "app.stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(event = "app.failed", error = %e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
