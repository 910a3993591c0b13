//! Parcours CLI - Follow an assistance journey step by step

use clap::Parser;
use parcours::cli::commands;
use parcours::cli::{Cli, Commands};
use parcours::errors::to_exit_code;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over the flags
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(to_exit_code(&e));
        }
    }
}

async fn run(cli: Cli) -> parcours::Result<()> {
    let cwd = cli.cwd.as_deref();
    let json = cli.json;
    match cli.command {
        Some(Commands::Init { force }) => commands::init::run(cwd, force).await,
        Some(Commands::Status { owner }) => commands::status::run(cwd, &owner, json).await,
        Some(Commands::Intake { owner, file }) => {
            commands::intake::run(cwd, &owner, &file, json).await
        }
        Some(Commands::File { owner, case_number }) => {
            commands::file::run(cwd, &owner, case_number.as_deref(), json).await
        }
        Some(Commands::Validate { owner }) => commands::validate::run(cwd, &owner, json).await,
        Some(Commands::Advance { owner }) => commands::advance::run(cwd, &owner, json).await,
        Some(Commands::Sync { owner, step }) => {
            commands::sync::run(cwd, &owner, step, json).await
        }
        Some(Commands::Notify {
            case_number,
            status,
        }) => commands::notify::run(cwd, &case_number, status, json).await,
        Some(Commands::Watch { owner, interval }) => {
            commands::watch::run(cwd, &owner, interval, json).await
        }
        None => {
            // Default to showing help - clap handles this
            println!("Use --help for usage information");
            Ok(())
        }
    }
}
