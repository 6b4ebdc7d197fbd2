pub mod commands;

use clap::{Parser, Subcommand};
use pizzabot_core::config::{AppConfig, LoadOptions, LogFormat};
use std::process::ExitCode;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "pizzabot",
    about = "Pizzabot operator CLI",
    long_about = "Chat with the pizza ordering assistant, inspect configuration, and check service readiness.",
    after_help = "Examples:\n  pizzabot chat --offline\n  pizzabot doctor --json\n  pizzabot config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Hold an interactive ordering conversation on stdin/stdout")]
    Chat {
        #[arg(long, help = "Use the built-in demo menu instead of the pizza API")]
        offline: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, pizza API reachability, and language model readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Chat { offline } => commands::chat::run(offline),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays parseable. Falls back
/// to compact warnings when the configuration does not load; the command
/// itself reports that failure.
fn init_logging() {
    let config = AppConfig::load(LoadOptions::default()).ok();
    let (log_level, format) = logging_settings(config.as_ref());

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

fn logging_settings(config: Option<&AppConfig>) -> (Level, LogFormat) {
    match config {
        Some(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::WARN),
            config.logging.format,
        ),
        None => (Level::WARN, LogFormat::Compact),
    }
}
