//! Parkcheck CLI - Main Entry Point
//!
//! Runs the parking web app's browser scenarios, lists them, or opens an
//! interactive smoke check.
//!
//! Exit codes: 0 when every selected case passed, 1 when any failed, 2 when
//! the run could not be carried out.

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{demo, list, run};

/// Parkcheck - browser E2E suite for the vehicle parking app
#[derive(Parser)]
#[command(name = "parkcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario suite
    Run(run::RunArgs),

    /// List scenario cases
    List(list::ListArgs),

    /// Open a search page, type a query, and wait for Enter
    Demo(demo::DemoArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run::execute(args, cli.format).await,
        Commands::List(args) => list::execute(args, cli.format).map(|_| true),
        Commands::Demo(args) => demo::execute(args).await.map(|_| true),
    };

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}
