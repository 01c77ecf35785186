use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use artgrid_core::{ArticClient, CatalogSource, Config, FetchCommand, config_file};

mod action;
mod app;
mod backend;
mod input;
mod model;
mod theme;
mod view;

use app::App;

/// artgrid TUI - page through the artwork catalog and select rows across pages.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Rows per page (overrides the config file)
    #[arg(long)]
    page_size: Option<usize>,

    /// API root (overrides the config file)
    #[arg(long, env = "ARTGRID_BASE_URL")]
    base_url: Option<String>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,

    /// Write logs to this file instead of the platform cache directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Default log location: `<cache_dir>/artgrid/artgrid-tui.log`.
fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("artgrid").join("artgrid-tui.log"))
}

/// Route tracing output to a file; the terminal belongs to the UI.
fn init_logging(path: Option<PathBuf>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let path = path.or_else(default_log_file)?;
    let dir = path.parent()?;
    let file_name = path.file_name()?;
    std::fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env("ARTGRID_LOG")
        .unwrap_or_else(|_| EnvFilter::new("artgrid_core=info,artgrid_tui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.clone());

    // Resolve config from CLI flags > config file > defaults
    let mut config = Config::from_file(&config_file::load_config());
    if let Some(url) = args.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(size) = args.page_size {
        if size == 0 {
            anyhow::bail!("--page-size must be at least 1");
        }
        config.page_size = size;
    }
    if let Some(name) = args.theme {
        config.theme = name;
    }
    tracing::info!(base_url = %config.base_url, page_size = config.page_size, "starting artgrid-tui");

    let source: Arc<dyn CatalogSource> = Arc::new(ArticClient::from_config(&config)?);

    let mut app = App::new(
        config.page_size,
        &config.page_size_options,
        theme::Theme::from_name(&config.theme),
    );
    app.source_name = config.base_url.clone();

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    // Backend: commands in, completion messages out
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<FetchCommand>();
    let cancel = CancellationToken::new();

    let listener = backend::spawn_listener(
        source,
        config.max_concurrent_fetches,
        cmd_rx,
        event_tx,
        cancel.clone(),
    );

    app.connect(cmd_tx);
    app.start();

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let tick_rate = Duration::from_millis(config.tick_ms.max(10));

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            maybe_message = event_rx.recv() => {
                if let Some(message) = maybe_message {
                    app.handle_backend_message(message);
                    // Drain any additional queued completions
                    while let Ok(message) = event_rx.try_recv() {
                        app.handle_backend_message(message);
                    }
                }
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let action = input::map_event(&evt, &app.input_mode);
                        app.update(action);
                    }
                }
            } => {}
            _ = cancel.cancelled() => {
                app.should_quit = true;
            }
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            cancel.cancel();
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    let _ = listener.await;
    tracing::info!(selected = app.controller.selected_count(), "artgrid-tui exited");
    Ok(())
}
