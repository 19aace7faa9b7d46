//! Helpdesk CLI
//!
//! Inspect routing configuration and dry-run ticket routing.
//!
//! # Usage
//!
//! ```bash
//! helpdesk sla
//! helpdesk rules --format json
//! helpdesk agents
//! helpdesk route --title "Card declined" --priority high --category Billing --email ap@globex.com
//! helpdesk --config ./helpdesk.toml config show
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(version)]
#[command(about = "Helpdesk ticket routing and SLA engine", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.helpdesk/config.toml when present)
    #[arg(long, short, global = true, env = "HELPDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the SLA policy table
    Sla,
    /// Show assignment rules in evaluation order
    Rules,
    /// Show the agent roster
    Agents,
    /// Create a ticket against the configured roster and show where it lands
    Route(RouteArgs),
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(clap::Args)]
pub struct RouteArgs {
    #[arg(long)]
    pub title: String,
    /// low, medium, high or critical
    #[arg(long, default_value = "medium")]
    pub priority: String,
    #[arg(long)]
    pub category: Option<String>,
    /// Customer email
    #[arg(long)]
    pub email: String,
    /// Customer name
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Assign to this agent instead of running the rules
    #[arg(long)]
    pub agent: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let config_path = cli.config;
    match cli.command {
        Commands::Sla => commands::sla::handle(config_path.as_deref(), format),
        Commands::Rules => commands::rules::handle(config_path.as_deref(), format),
        Commands::Agents => commands::agents::handle(config_path.as_deref(), format),
        Commands::Route(args) => commands::route::handle(args, config_path.as_deref(), format),
        Commands::Config { action } => commands::config::handle(action, config_path.as_deref(), format),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
