mod config;
mod identity;
mod remote;
mod sync;
mod todo;
mod tui;

use anyhow::{Context, Result, bail};
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use config::{Config, ConfigError};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use identity::ConfigIdentity;
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use remote::memory::InMemoryGateway;
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::app::{App, Background};
use tui::ui;

#[derive(Parser)]
#[command(name = "todo-live")]
#[command(about = "A terminal client for a live-synced personal todo list")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign in with a login identifier such as an email address")]
    Login {
        #[arg(help = "Login identifier, e.g. jane.doe@example.com")]
        login_id: String,
    },
    #[command(about = "Forget the signed-in user")]
    Logout,
    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (login_id, log_level, latency_ms)")]
        key: String,
        #[arg(help = "Configuration value")]
        value: String,
    },
    #[command(about = "Get a configuration value")]
    Get {
        #[arg(help = "Configuration key")]
        key: String,
    },
    #[command(about = "List all configuration values")]
    List,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Login { login_id }) => {
            set_config_value("login_id", login_id).map_err(anyhow::Error::from)
        }
        Some(Commands::Logout) => {
            set_config_value("login_id", String::new()).map_err(anyhow::Error::from)
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action).map_err(anyhow::Error::from)
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
            Ok(())
        }
        None => run_main_app(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn set_config_value(key: &str, value: String) -> Result<(), ConfigError> {
    let mut config = Config::load_or_default()?;
    config.set(key, value)?;
    config.save()?;
    println!("Configuration saved successfully.");
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Set { key, value } => set_config_value(&key, value)?,
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for key in config::KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
    }
    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = config::log_file_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_main_app() -> Result<()> {
    let config = Config::load_or_default()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    if config.login_id.is_none() {
        bail!("Not signed in. Run 'todo-live login <email>' first.");
    }

    init_logging(&config)?;
    info!(latency_ms = config.latency_ms, "starting todo-live");

    let gateway = Arc::new(InMemoryGateway::with_latency(Duration::from_millis(
        config.latency_ms,
    )));
    let identity = Box::new(ConfigIdentity::new(config));
    let mut app = App::new(gateway, identity);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run_tui(&mut app))
}

async fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app).await;
    app.unmount();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

enum Step {
    Terminal(Option<io::Result<Event>>),
    Background(Background),
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut events = EventStream::new();
    app.mount().await;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let step = tokio::select! {
            event = events.next() => Step::Terminal(event),
            background = app.next_background() => Step::Background(background),
        };

        match step {
            Step::Terminal(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
                app.handle_key_event(key)?;
                if app.should_quit {
                    break;
                }
            }
            Step::Terminal(Some(Err(e))) => return Err(e.into()),
            Step::Terminal(None) => break,
            Step::Terminal(Some(Ok(_))) => {}
            Step::Background(background) => app.handle_background(background),
        }
    }
    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
