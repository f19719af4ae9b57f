mod api;
mod app;
mod cli;
mod commands;
mod config;
mod event;
mod host;
mod model;
mod prompt;
mod registry;
mod secrets;
mod tree;
mod ui;
mod vcs;

use std::io;
use std::panic;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use api::YouTrackConnector;
use app::{Action, App, Services};
use config::SettingsStore;
use host::SystemOpener;
use registry::ServerRegistry;
use secrets::FileSecretStore;
use vcs::{GitCli, VersionControl};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {}
        Some("servers") => return cli::handle_servers(),
        Some("add-server") => return cli::handle_add_server(&args[1..]),
        Some("projects") => return cli::handle_projects().await,
        Some("help" | "-h" | "--help") => {
            cli::print_help();
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {other}\n");
            cli::print_help();
            std::process::exit(2);
        }
    }

    init_file_logging()?;

    // Load config
    let config = config::load_config()?;
    let settings = Arc::new(SettingsStore::new(
        config.youtrack,
        Some(config::config_path()),
    ));

    let cwd = std::env::current_dir()?;
    let vcs = GitCli::discover(&cwd).await.map(|git| {
        tracing::info!(root = %git.root().display(), "git repository found");
        Arc::new(git) as Arc<dyn VersionControl>
    });

    let services = Services {
        registry: ServerRegistry::new(Arc::new(FileSecretStore::open_default())),
        settings: Arc::clone(&settings),
        connector: Arc::new(YouTrackConnector),
        opener: Arc::new(SystemOpener),
        vcs,
    };

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(services, action_tx.clone());

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    tokio::spawn(event::run_event_loop(action_tx.clone()));
    tokio::spawn(event::watch_settings(settings.subscribe(), action_tx));

    tracing::info!("starting");
    terminal.draw(|f| ui::render(f, &app))?;
    app.start().await;

    // Main loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(action) = action_rx.recv().await {
            app.update(action).await;
            if app.should_quit {
                break;
            }
        } else {
            break;
        }
    }

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    tracing::info!("exiting");
    Ok(())
}

/// Log to a file; stdout belongs to the TUI. `RUST_LOG` overrides the level.
fn init_file_logging() -> Result<()> {
    let log_path = config::log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    Ok(())
}
