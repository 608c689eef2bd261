mod app;
mod handler;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Mutex;

use agentchat_core::{ChatRole, ChatSession, Config, RequestFormat, WorkflowClient};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "agentchat")]
#[command(about = "Chat with an agent workflow endpoint from the terminal")]
#[command(version)]
struct Cli {
    /// Base URL of the workflow backend (e.g. http://localhost:8000)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request format: multipart or hybrid
    #[arg(long, global = true, value_parser = parse_format)]
    format: Option<RequestFormat>,

    /// Save the effective endpoint and format to the config file
    #[arg(long, global = true)]
    save: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message (and/or file) and print the reply
    Send {
        /// Message text
        message: Option<String>,
        /// File to attach
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn parse_format(s: &str) -> std::result::Result<RequestFormat, String> {
    RequestFormat::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = RequestFormat::all().iter().map(|f| f.as_str()).collect();
        format!("unknown format '{s}', expected one of: {}", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs go to a file
    match cli.command {
        Some(Commands::Send { .. }) => init_stderr_logging(),
        None => init_file_logging()?,
    }

    let config = apply_overrides(Config::load(), cli.endpoint, cli.format, cli.save)?;
    if cli.save {
        let path = config.save().context("saving config")?;
        info!(path = %path.display(), "config saved");
    }

    let client = WorkflowClient::new(config.endpoint(), config.request_format());
    info!(endpoint = client.base_url(), format = client.format().as_str(), "client ready");
    let session = ChatSession::new(client);

    match cli.command {
        Some(Commands::Send { message, file }) => send_once(session, message, file).await,
        None => run_tui(session).await,
    }
}

/// Layer command-line overrides onto the loaded config. An unreadable config
/// falls back to defaults, unless it is about to be saved over.
fn apply_overrides(
    loaded: agentchat_core::Result<Config>,
    endpoint: Option<String>,
    format: Option<RequestFormat>,
    save: bool,
) -> Result<Config> {
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) if save => {
            return Err(e).context("refusing to --save over a config that failed to load");
        }
        Err(e) => {
            warn!(error = %e, "could not load config, using defaults");
            Config::new()
        }
    };
    if let Some(endpoint) = endpoint {
        config.endpoint = Some(endpoint);
    }
    if let Some(format) = format {
        config.request_format = Some(format);
    }
    Ok(config)
}

async fn send_once(mut session: ChatSession, message: Option<String>, file: Option<PathBuf>) -> Result<()> {
    if let Some(text) = message {
        session.set_input(text);
    }
    if let Some(path) = file {
        session
            .select_file(&path)
            .with_context(|| format!("cannot attach {}", path.display()))?;
    }

    if !session.submit().await {
        bail!("nothing to send: give a message or --file");
    }

    for msg in session.transcript().messages() {
        let label = match msg.role {
            ChatRole::User => "You",
            ChatRole::Assistant => "Agent",
        };
        println!("[{}] {}: {}", msg.created_at.format("%H:%M"), label, msg.content);
    }
    Ok(())
}

async fn run_tui(session: ChatSession) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(session, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

fn init_file_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentchat");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("agentchat.log"))?;

    let filter = EnvFilter::try_from_env("AGENTCHAT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    let filter = EnvFilter::try_from_env("AGENTCHAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_refused_when_config_unreadable() {
        let loaded = Err(agentchat_core::ChatError::config("invalid config"));
        let result = apply_overrides(loaded, Some("http://other:9000".to_string()), None, true);
        assert!(result.is_err());
    }

    #[test]
    fn test_unreadable_config_falls_back_without_save() {
        let loaded = Err(agentchat_core::ChatError::config("invalid config"));
        let config = apply_overrides(loaded, None, None, false).unwrap();
        assert!(config.endpoint.is_none());
        assert!(config.request_format.is_none());
    }

    #[test]
    fn test_overrides_replace_loaded_values() {
        let mut loaded = Config::new();
        loaded.endpoint = Some("http://saved:8000".to_string());
        let config = apply_overrides(
            Ok(loaded),
            Some("http://flag:9000".to_string()),
            Some(RequestFormat::Hybrid),
            true,
        )
        .unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://flag:9000"));
        assert_eq!(config.request_format, Some(RequestFormat::Hybrid));
    }

    #[test]
    fn test_cli_parses_send() {
        let cli = Cli::parse_from(["agentchat", "--format", "hybrid", "send", "hi", "-f", "a.pdf"]);
        assert_eq!(cli.format, Some(RequestFormat::Hybrid));
        match cli.command {
            Some(Commands::Send { message, file }) => {
                assert_eq!(message.as_deref(), Some("hi"));
                assert_eq!(file, Some(PathBuf::from("a.pdf")));
            }
            None => panic!("expected send"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["agentchat", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_cli_defaults_to_tui() {
        let cli = Cli::parse_from(["agentchat"]);
        assert!(cli.command.is_none());
        assert!(cli.endpoint.is_none());
        assert!(!cli.save);
    }
}
