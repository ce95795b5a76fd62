use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use weird_splash::app::App;
use weird_splash::config::{generate_config_file, load_config, load_config_from_path};
use weird_splash::terminal::TerminalGuard;
use weird_splash::ui::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// MAIN
// ============================================================================

#[derive(Parser)]
#[command(name = "weird-splash")]
#[command(version)]
#[command(
    about = "weird.cloud as a terminal splash: click the cards and see what happens",
    long_about = None
)]
struct Cli {
    /// Generate default configuration file
    #[arg(short, long)]
    init: bool,

    /// Specify custom config file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(short, long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    // Handle --init flag
    if cli.init {
        let config_path = generate_config_file()?;
        println!(
            "Default configuration file created at: {}",
            config_path.display()
        );
        println!("Edit this file to customize weird-splash's appearance and behavior.");
        return Ok(());
    }

    let config = if let Some(config_path) = &cli.config {
        load_config_from_path(config_path)?
    } else {
        load_config()
    };

    // Setup terminal; dropping the guard restores it on every exit path
    let guard = TerminalGuard::enter(io::stdout())?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(config);
    tracing::info!("splash started");
    let res = run_app(&mut terminal, &mut app);
    app.panel.shutdown();

    drop(terminal);
    drop(guard);

    if let Err(err) = res {
        tracing::error!(error = %err, "event loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Logs go to a file since the terminal belongs to the splash.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut area = Rect::default();

    loop {
        app.panel.tick();
        if app.take_redraw() {
            area = terminal.draw(|f| ui(f, app))?.area;
        }

        if app.should_quit {
            break;
        }

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(&key)?,
                Event::Mouse(mouse) => app.handle_mouse(&mouse, area)?,
                Event::Resize(_, _) => app.request_redraw(),
                _ => {}
            }
        }
    }
    Ok(())
}
