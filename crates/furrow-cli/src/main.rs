//! furrow CLI: Farm Budget Planner chat in the terminal

use clap::{Parser, Subcommand};
use furrow_engine::{ChatSession, Config, Role, Submission};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Farm budget planning assistant (simulated replies)
#[derive(Parser)]
#[command(name = "furrow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Load configuration from a JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Tui,

    /// Ask one question without the TUI and print the transcript
    Ask {
        /// The question to ask
        text: String,

        /// Output messages as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}

const DEFAULT_LOG_FILTER: &str = "furrow=info,furrow_engine=info,furrow_tui=info";

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => Config::default(),
    };

    match cli.command {
        None | Some(Commands::Tui) => {
            // The TUI owns the terminal, so only log when sent to a file
            if let Some(path) = &cli.log_file {
                init_file_logging(path);
            }
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            if let Err(e) = rt.block_on(furrow_tui::run_tui(&config)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { text, json }) => {
            match &cli.log_file {
                Some(path) => init_file_logging(path),
                None => init_stderr_logging(),
            }
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(cmd_ask(&config, &text, json));
        }
        Some(Commands::Config) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&config).expect("failed to serialize")
            );
        }
    }
}

fn load_config(path: &Path) -> Config {
    match Config::load(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_file_logging(path: &Path) {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .with(env_filter())
        .init();
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(env_filter())
        .init();
}

async fn cmd_ask(config: &Config, text: &str, json: bool) {
    let mut session = ChatSession::from_config(config);

    match session.submit(text) {
        Ok(Submission::Ignored) => {
            eprintln!("Nothing to ask: the question is empty");
            std::process::exit(1);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    session.settle().await;
    info!(
        session = %session.conversation().id(),
        messages = session.messages().len(),
        "Headless question answered"
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(session.messages()).expect("failed to serialize")
        );
        return;
    }

    for message in session.messages() {
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!("[{}] {who}:", message.id);
        for line in message.content.lines() {
            println!("  {line}");
        }
        println!();
    }
}
