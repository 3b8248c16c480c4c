use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod services;
mod ui;

use cli::{Cli, Commands};
use commands::{render, templates, validate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    // stdout carries the plan, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    match cli.command {
        Commands::Render {
            release,
            current_replicas,
            release_id,
            output,
        } => {
            render::execute(release, current_replicas, release_id, output).await?;
        }
        Commands::Validate { release } => {
            validate::execute(release).await?;
        }
        Commands::Templates { release } => {
            templates::execute(release).await?;
        }
    }

    Ok(())
}
