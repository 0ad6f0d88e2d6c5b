//! content-studio CLI entry point
//!
//! Messages, help and errors are English. Generated posts are Spanish, as set
//! by the prompt texts in the domain crate.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable
    let log_level = match &cli.log_level {
        Some(level) => level.clone(),
        None => config::AppConfig::load(cli.config.as_deref())
            .map(|c| c.general.log_level)
            .unwrap_or_else(|_| "info".to_string()),
    };
    init_logging(&log_level)?;

    match cli.command {
        Commands::Tweet(args) => commands::post::tweet(args, cli.config).await,
        Commands::Thread(args) => commands::post::thread(args, cli.config).await,
        Commands::Proofread(args) => commands::post::proofread(args, cli.config).await,
        Commands::Regenerate(args) => commands::post::regenerate(args, cli.config).await,
        Commands::Summarize(args) => commands::research::summarize(args, cli.config).await,
        Commands::Search(args) => commands::research::search(args, cli.config).await,
        Commands::Image(args) => commands::media::image(args, cli.config).await,
        Commands::EditImage(args) => commands::media::edit_image(args, cli.config).await,
        Commands::Video(args) => commands::media::video(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args).await,
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
