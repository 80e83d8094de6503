//! CLI module - command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod analyze;
pub mod common;
pub mod config;
pub mod serve;
pub mod tokens;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "finsight")]
#[command(version)]
#[command(about = "Bank statement analysis and financial advice from an LLM", long_about = None)]
struct Cli {
    /// Config file (default: ~/.finsight/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// OpenAI API key (overrides config and FINSIGHT_OPENAI_API_KEY)
    #[arg(long, global = true, value_name = "KEY")]
    api_key: Option<String>,

    /// Model name (chat model, or tokenizer model for `tokens`)
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize statements and print financial advice
    Summary {
        /// Statement files (PDF or plain text)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print a categorized expense breakdown
    Expenses {
        /// Statement files (PDF or plain text)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Also write the breakdown as CSV
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
        /// Print the expense map as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Summarize, then answer follow-up questions interactively
    Chat {
        /// Statement files (PDF or plain text)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Count tokens of a file (or stdin)
    Tokens {
        /// Input file; reads stdin when omitted
        source: Option<PathBuf>,
    },
    /// Start the HTTP server
    Serve {
        /// Host address to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check the config file for unknown fields and invalid settings
    Check,
}

/// Options shared by every command.
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

pub async fn run() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let globals = GlobalArgs {
        config: cli.config,
        api_key: cli.api_key,
        model: cli.model,
    };

    // Logging follows the config file; a broken config is reported by the
    // command itself, so fall back to defaults here.
    let logging_cfg = common::load_config(&globals)
        .map(|c| c.logging)
        .unwrap_or_default();
    finsight::utils::logging::init_logging(&logging_cfg)?;

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Version) => {
            cmd_version();
        }
        Some(Commands::Summary { files }) => {
            analyze::cmd_summary(&globals, files).await?;
        }
        Some(Commands::Expenses { files, csv, json }) => {
            analyze::cmd_expenses(&globals, files, csv, json).await?;
        }
        Some(Commands::Chat { files }) => {
            analyze::cmd_chat(&globals, files).await?;
        }
        Some(Commands::Tokens { source }) => {
            tokens::cmd_tokens(&globals, source)?;
        }
        Some(Commands::Serve { host, port }) => {
            serve::cmd_serve(&globals, host, port).await?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(&globals, action)?;
        }
    }

    Ok(())
}

/// Display version information
fn cmd_version() {
    println!("finsight {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Bank statement analysis and financial advice from an LLM");
}
