//! authforms - terminal front end for the EyePredict account forms.
//!
//! Shows the registration and login forms, submits them to the
//! authentication API and keeps the session token for the rest of the
//! EyePredict tooling.

mod app;
mod prompt;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use authforms_core::{Config, FormKind};

use app::{App, AppState, Page};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds).
/// Short enough that message expiry and redirects show up promptly.
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix in the cache directory
const LOG_FILE_PREFIX: &str = "authforms.log";

const USAGE: &str = "\
Usage: authforms [COMMAND]

Commands:
  (none)          Open the login page
  --register      Open the registration page
  register        Register from the prompt, without the TUI
  login           Log in from the prompt, without the TUI
  --init-config   Write the effective configuration to the config file
  --help          Show this message

Environment:
  AUTHFORMS_API_BASE     Authentication API base (default http://127.0.0.1:8000/auth)
  AUTHFORMS_TOKEN_STORE  file | keyring
  RUST_LOG               Log filter (default warn)";

/// What the command line asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tui(Page),
    Headless(FormKind),
    InitConfig,
    Help,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None => Some(Command::Tui(Page::Login)),
            Some("--register") => Some(Command::Tui(Page::Register)),
            Some("register") => Some(Command::Headless(FormKind::Register)),
            Some("login") => Some(Command::Headless(FormKind::Login)),
            Some("--init-config") => Some(Command::InitConfig),
            Some("--help") | Some("-h") => Some(Command::Help),
            Some(_) => None,
        }
    }
}

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to a daily file so the alternate screen stays clean.
/// The guard must live until shutdown to flush buffered lines.
fn init_file_tracing() -> Option<WorkerGuard> {
    let dir = match Config::cache_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Some(guard)
}

fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let arg = args.get(1).map(String::as_str);
    let Some(command) = Command::parse(arg) else {
        eprintln!("Unknown argument: {}\n\n{}", arg.unwrap_or_default(), USAGE);
        std::process::exit(2);
    };
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    // Tracing goes up before the config so its warnings are not lost
    let _log_guard = match command {
        Command::Tui(_) => init_file_tracing(),
        _ => {
            init_stderr_tracing();
            None
        }
    };

    let config = Config::load()?;

    let start = match command {
        Command::Tui(page) => page,
        Command::Headless(kind) => return prompt::run(&config, kind).await,
        Command::InitConfig => {
            let path = config.save()?;
            println!("Wrote {}", path.display());
            return Ok(());
        }
        Command::Help => return Ok(()),
    };

    info!(api_base = %config.api_base, "authforms starting");

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new(&config, start)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        warn!(error = %e, "UI loop failed");
        eprintln!("Error: {}", e);
    }

    info!("authforms shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so finished submissions, expiring
        // messages and redirects are picked up
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Submission results and redirects
        app.check_host_events();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse(None), Some(Command::Tui(Page::Login)));
        assert_eq!(Command::parse(Some("--register")), Some(Command::Tui(Page::Register)));
        assert_eq!(Command::parse(Some("login")), Some(Command::Headless(FormKind::Login)));
        assert_eq!(Command::parse(Some("register")), Some(Command::Headless(FormKind::Register)));
        assert_eq!(Command::parse(Some("--init-config")), Some(Command::InitConfig));
        assert_eq!(Command::parse(Some("-h")), Some(Command::Help));
        assert_eq!(Command::parse(Some("--verbose")), None);
    }
}
