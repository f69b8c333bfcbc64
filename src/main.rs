mod store;
mod task;
mod ui;

use clap::{Arg, Command};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use store::TaskStore;
use task::Filter;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let matches = Command::new("tasklight")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Single-user to-do list with a terminal UI")
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .value_name("PATH")
                .help("Backing file for the task list"),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .value_name("MODE")
                .help("Initial filter: all, active, or completed"),
        )
        .get_matches();

    let data_path = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .unwrap_or_else(default_data_path);
    if let Some(parent) = data_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    init_logging(&data_path)?;

    let filter = matches
        .get_one::<String>("filter")
        .map(|s| Filter::parse(s))
        .unwrap_or_default();

    let mut store = TaskStore::load(&data_path);
    info!(
        "loaded {} tasks from {}",
        store.stats().total,
        store.path().display()
    );

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut store, filter);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}

fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tasklight").join("tasks.json"))
        .unwrap_or_else(|| PathBuf::from("tasks.json"))
}

/// Logs go to a file next to the backing file; stderr would tear the TUI.
fn init_logging(data_path: &Path) -> anyhow::Result<()> {
    let log_path = data_path.with_file_name("tasklight.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
