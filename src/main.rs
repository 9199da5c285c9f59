// src/main.rs

use color_eyre::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

mod app;
mod config;
mod core;
mod logging;
mod report_store;
mod ui;

use app::{App, AppState};
use config::ScanConfig;
use core::models::ScanOutcome;
use core::scanner::ScanPhase;
use report_store::JsonReportStore;

const TICK_RATE: Duration = Duration::from_millis(100);

/// What a new scan is started with: its settings and the channels it
/// reports back on.
struct ScanChannels {
    config: ScanConfig,
    outcome_tx: mpsc::Sender<ScanOutcome>,
    progress_tx: mpsc::UnboundedSender<ScanPhase>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Krypt Analyzer.");

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let result = run(&mut terminal).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    info!("Krypt Analyzer exited.");
    result
}

async fn run(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    let mut app = App::new();
    let store = JsonReportStore::default_location();
    let (outcome_tx, mut outcome_rx) = mpsc::channel(1);
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let channels = ScanChannels { config: ScanConfig::load(), outcome_tx, progress_tx };

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(TICK_RATE)? {
            handle_events(&mut app, &channels, &store)?;
        }

        while let Ok(phase) = progress_rx.try_recv() {
            app.phase = Some(phase);
        }

        if let Ok(outcome) = outcome_rx.try_recv() {
            app.finish_scan(outcome, &store);
        }

        app.on_tick();
    }
    Ok(())
}

fn handle_events(app: &mut App, channels: &ScanChannels, store: &JsonReportStore) -> Result<()> {
    let Event::Key(key) = event::read()? else {
        return Ok(());
    };
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    if app.show_disclaimer {
        match key.code {
            KeyCode::Enter => app.show_disclaimer = false,
            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
            _ => {}
        }
        return Ok(());
    }

    match app.state {
        AppState::Idle => handle_idle_input(app, key.code, channels, store),
        AppState::Scanning => {
            if key.code == KeyCode::Char('q') { app.quit(); }
        }
        AppState::Finished | AppState::Failed => handle_finished_input(app, key.code, store),
        AppState::Reports => handle_reports_input(app, key.code, store),
    }
    Ok(())
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, channels: &ScanChannels, store: &JsonReportStore) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.open_reports(store),
        KeyCode::F(2) => app.toggle_logs(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => { app.input.pop(); },
        KeyCode::Enter => {
            let target = app.input.trim().to_string();
            if target.is_empty() { return; }
            app.start_scan();

            let outcome_tx = channels.outcome_tx.clone();
            let progress_tx = channels.progress_tx.clone();
            let config = channels.config.clone();
            tokio::spawn(async move {
                let outcome = core::scanner::run_full_scan(&target, config, Some(progress_tx)).await;
                let _ = outcome_tx.send(outcome).await;
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode, store: &JsonReportStore) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('r') => app.open_reports(store),
        KeyCode::Char('l') => app.toggle_logs(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::Left => app.scroll_logs_left(),
        KeyCode::Right => app.scroll_logs_right(),
        _ => {}
    }
}

fn handle_reports_input(app: &mut App, key_code: KeyCode, store: &JsonReportStore) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.close_reports(),
        KeyCode::Enter => app.open_selected_report(store),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        _ => {}
    }
}
