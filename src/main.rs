//! Main entry point for the tv-browser CLI application.

use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info, warn};
use ratatui::prelude::*;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tv_browser::api::{CatalogSource, FileCatalog, TvMazeClient};
use tv_browser::config::Config;
use tv_browser::coordinator::{Coordinator, FetchOutcome};
use tv_browser::error::{AppError, Result};
use tv_browser::tui::{draw, poll_event, Action, App};

/// Command-line arguments for the tv-browser application.
#[derive(Parser, Debug)]
#[command(
    name = "tv-browser",
    version,
    about = "Browse TV shows and their episodes in the terminal",
    long_about = "Browse, filter, and open TV show episodes from the TVMaze catalog (or a directory of JSON files) using a TUI interface."
)]
struct Args {
    /// Base URL of the catalog API (overrides config)
    #[arg(short, long)]
    api_url: Option<String>,

    /// Browse static JSON files in this directory instead of the API
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Browser used to open episode pages (overrides config and platform default)
    #[arg(short, long)]
    browser: Option<String>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Write logs to this file (default: tv-browser.log in the user cache directory)
    #[arg(long)]
    log_file: Option<String>,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

/// Search for an executable in the system PATH.
///
/// Absolute paths and paths with separators are checked directly; on Windows
/// the PATHEXT extensions are tried as well.
fn find_in_path<P: AsRef<Path>>(exe_name: P) -> Option<PathBuf> {
    let exe_path = exe_name.as_ref();

    if exe_path.is_absolute()
        || exe_path
            .to_string_lossy()
            .contains(std::path::MAIN_SEPARATOR)
    {
        return exe_path.is_file().then(|| exe_path.to_path_buf());
    }

    env::var_os("PATH").and_then(|paths| {
        #[cfg(windows)]
        let extensions: Vec<String> = env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(|s| s.to_lowercase())
            .collect();

        env::split_paths(&paths).find_map(|dir| {
            let full_path = dir.join(exe_path);

            if full_path.is_file() {
                return Some(full_path);
            }

            #[cfg(windows)]
            {
                for ext in &extensions {
                    let with_ext = full_path.with_extension(ext.trim_start_matches('.'));
                    if with_ext.is_file() {
                        return Some(with_ext);
                    }
                }
            }

            None
        })
    })
}

/// Get the command that opens a URL with the desktop's default handler.
fn get_opener() -> std::result::Result<(&'static str, Vec<&'static str>), String> {
    match std::env::consts::OS {
        "linux" | "freebsd" | "openbsd" | "netbsd" => Ok(("xdg-open", Vec::new())),
        "macos" => Ok(("open", Vec::new())),
        "windows" => Ok(("cmd", vec!["/C", "start", ""])),
        other => Err(format!("OS '{}' is not supported", other)),
    }
}

/// Open `url` in the configured browser, detached from the terminal.
fn open_in_browser(browser: Option<&str>, browser_args: &[String], url: &str) -> Result<()> {
    let mut cmd = match browser {
        Some(browser) => {
            if find_in_path(browser).is_none() {
                return Err(AppError::Browser(format!("{} not found in PATH", browser)));
            }
            let mut cmd = Command::new(browser);
            cmd.args(browser_args);
            cmd
        }
        None => {
            let (opener, opener_args) = get_opener().map_err(AppError::Browser)?;
            let mut cmd = Command::new(opener);
            cmd.args(opener_args);
            cmd
        }
    };
    cmd.arg(url);

    debug!("Opening: {}", url);

    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| AppError::Browser(e.to_string()))?;
    Ok(())
}

/// Initialize logging into `log_path`.
///
/// The TUI owns stdout and stderr, so log records never go to the terminal:
/// without a usable file they are discarded.
fn init_logging(level: u8, log_path: Option<&Path>) {
    let log_level = match level {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false);

    let target: Box<dyn io::Write + Send> = match log_path.map(open_log_file) {
        Some(Ok(file)) => Box::new(file),
        Some(Err(e)) => {
            eprintln!("Warning: cannot open log file: {}. Logging disabled.", e);
            Box::new(io::sink())
        }
        None => Box::new(io::sink()),
    };
    builder.target(env_logger::Target::Pipe(target));

    builder.init();
    debug!("Log level set to {:?}", log_level);
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        let path = Config::create_default_if_missing()?;
        println!("Config file: {}", path.display());
        return Ok(());
    }

    // Load config before logging so `log_file` can come from it
    let config_result = Config::load();
    let config = match &config_result {
        Ok(config) => config.clone(),
        Err(_) => Config::new(),
    };

    // Merge config with CLI args
    let log_path = config.log_path(args.log_file.as_deref());
    init_logging(args.log, log_path.as_deref());

    if let Err(e) = config_result {
        warn!("Failed to load config: {}. Using defaults.", e);
    }

    let api_url = args.api_url.unwrap_or_else(|| config.api_url.clone());
    let data_dir = args.data_dir.or_else(|| config.data_dir.clone());
    let browser = args.browser.or_else(|| config.browser.clone());

    let catalog: Arc<dyn CatalogSource> = match &data_dir {
        Some(dir) => {
            info!("Browsing catalog files in {}", dir);
            Arc::new(FileCatalog::new(dir))
        }
        None => {
            info!("Using catalog API at {}", api_url);
            let timeout = Duration::from_secs(config.request_timeout_secs);
            Arc::new(TvMazeClient::new(&api_url, timeout)?)
        }
    };

    let (mut coordinator, outcomes) = Coordinator::new(catalog);
    coordinator.load_shows();

    // Initialize terminal
    let mut terminal = init_terminal()?;

    let mut app = App::new(config.keybindings.clone());

    // Main event loop
    let result = run_app(
        &mut terminal,
        &mut app,
        &mut coordinator,
        outcomes,
        browser.as_deref(),
        &config.browser_args,
    );

    // Restore terminal
    restore_terminal()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    coordinator: &mut Coordinator,
    mut outcomes: mpsc::UnboundedReceiver<FetchOutcome>,
    browser: Option<&str>,
    browser_args: &[String],
) -> Result<()> {
    loop {
        // Apply finished fetches on this task only
        loop {
            match outcomes.try_recv() {
                Ok(outcome) => coordinator.apply(outcome),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(AppError::Io(io::Error::other("fetch channel closed")));
                }
            }
        }

        let view = coordinator.view();
        terminal.draw(|f| draw(f, app, &view))?;

        let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? else {
            continue;
        };

        let action = app.handle_input(key, &view);

        match action {
            Action::None => {}
            Action::Quit => break,
            Action::Search(query) => coordinator.set_query(query),
            Action::ClearSearch => coordinator.clear_query(),
            Action::SelectShow(show_id) => coordinator.select_show(show_id),
            Action::BackToShows => coordinator.back_to_shows(),
            Action::Jump(target) => coordinator.jump_to(target),
            Action::Retry => coordinator.retry(),
            Action::Watch(code) => match coordinator.watch_url(code) {
                Some(url) => {
                    if let Err(e) = open_in_browser(browser, browser_args, url) {
                        warn!("Failed to open {}: {}", url, e);
                        app.set_status(&e.to_string());
                    }
                }
                None => app.set_status(&format!("{} has no detail page.", code)),
            },
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
