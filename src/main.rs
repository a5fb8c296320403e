//! clipcast CLI entry point.

use anyhow::Result;
use clap::Parser;
use clipcast::cli::{commands, Cli, Commands};
use clipcast::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let mut settings = Settings::load_from(Some(&config_path))?;

    if let Some(dir) = &cli.episodes {
        settings.general.episodes_dir = dir.clone();
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("clipcast={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Ask {
            question,
            episode,
            season,
            debug,
        } => {
            commands::run_ask(&question, episode.as_deref(), season.as_deref(), debug, settings)
                .await?;
        }

        Commands::Chat { episode } => {
            commands::run_chat(episode.as_deref(), settings).await?;
        }

        Commands::Search {
            query,
            episode,
            season,
            strategy,
            limit,
        } => {
            commands::run_search(
                &query,
                episode.as_deref(),
                season.as_deref(),
                strategy,
                limit,
                settings,
            )?;
        }

        Commands::List => {
            commands::run_list(settings)?;
        }

        Commands::Segments {
            episode,
            strategy,
            output,
        } => {
            commands::run_segments(&episode, strategy, output, settings)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
