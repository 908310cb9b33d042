//! ticketdesk - terminal front-end for the support-ticket dashboard.
//!
//! Every invocation is one page visit: the stored session is resolved, the
//! page guard runs, then the command renders or acts.
//!
//! ```bash
//! ticketdesk login ana@example.com
//! ticketdesk tickets --status abierto
//! ticketdesk ticket status 41 cerrado
//! ticketdesk reports
//! ```
//!
//! Exit codes: `0` success, `1` error, `2` redirected (sign in first, or
//! already signed in), `3` forbidden for this role.

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;
mod config;
mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::commands::{App, Command};
use crate::config::AppConfig;

/// Role-aware support-ticket dashboard for the terminal
#[derive(Parser, Debug)]
#[command(name = "ticketdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to ./ticketdesk.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the ticket service (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.api_url.as_deref());

    logging::init(&config.logging, cli.verbose);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    let command = cli.command.unwrap_or(Command::Home);
    tracing::debug!(route = %command.route(), "starting");

    let app = App::start(&config, command.route()).await?;
    Ok(app.run(command).await)
}
