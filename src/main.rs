mod config;
mod logging;
mod ports;
mod services;
mod spotify_rs;
#[cfg(test)]
mod test_utils;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, OptionExt},
};

use crate::{
    config::Config,
    logging::setup_logging,
    services::{
        progress::LogObserver,
        spotify::client::SpotifyWebClient,
        synthesis::{
            CommitOutcome, FanOutPolicy, SynthesisOptions, SynthesisRequest, Synthesizer,
        },
    },
    spotify_rs::{AccessToken, Endpoints, SpotifyHttpClient},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "DAILY_DRIVE_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: info)
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "DAILY_DRIVE_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a fresh mix in your private playlist
    Generate {
        /// Spotify access token with the playlist and library scopes
        #[arg(short = 't', long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,

        /// Name of the playlist to fill
        #[arg(short, long)]
        name: Option<String>,

        /// Number of blocks, one per seed track
        #[arg(short, long)]
        blocks: Option<usize>,

        /// Tracks per block, seed included
        #[arg(long)]
        block_size: Option<usize>,

        /// Put one episode from your Daily Drive in front of each block
        #[arg(long, overrides_with = "no_podcasts")]
        with_podcasts: bool,

        /// Leave podcasts out even when the config turns them on
        #[arg(long, overrides_with = "with_podcasts")]
        no_podcasts: bool,

        /// Recommendation requests in flight at once
        #[arg(long)]
        concurrency: Option<NonZeroUsize>,

        /// Seed for the track shuffle, for reproducible picks
        #[arg(long)]
        seed: Option<u64>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

/// `Some` when the command line says either way, the last flag winning.
fn podcasts_flag(with_podcasts: bool, no_podcasts: bool) -> Option<bool> {
    match (with_podcasts, no_podcasts) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Loading configuration");
    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load daily-drive config")?;

    match args.command {
        Commands::Generate {
            access_token,
            name,
            blocks,
            block_size,
            with_podcasts,
            no_podcasts,
            concurrency,
            seed,
        } => {
            let request = SynthesisRequest::new(
                name.unwrap_or_else(|| config.mix.name.clone()),
                blocks.unwrap_or(config.mix.blocks),
                block_size.unwrap_or(config.mix.block_size),
                podcasts_flag(with_podcasts, no_podcasts).unwrap_or(config.mix.with_podcasts),
            )?;

            let max_in_flight = match concurrency {
                Some(concurrency) => concurrency,
                None => NonZeroUsize::new(config.mix.max_concurrent_recommendations)
                    .ok_or_eyre("mix.max_concurrent_recommendations must be at least 1")?,
            };
            let options = SynthesisOptions {
                fan_out: FanOutPolicy::bounded(max_in_flight),
                shuffle_seed: seed,
                playlist_description: config.mix.description.clone(),
            };

            let http = SpotifyHttpClient::new(AccessToken::new(access_token))
                .with_timeout(config.spotify.request_timeout());
            let endpoints = Endpoints::new(&config.spotify.api_base_url)
                .wrap_err("Invalid Spotify API base url in config")?;
            let client =
                SpotifyWebClient::new(http, endpoints).with_max_pages(config.spotify.max_pages);

            let synthesizer = Synthesizer::new(client, Arc::new(LogObserver), options);
            let report = synthesizer.synthesize(&request).await?;

            log::debug!("Playlist order: {}", report.uris.join(", "));
            if report.provisioning.may_contain_old_items() {
                log::warn!(
                    "Playlist '{}' could not be emptied, old items are still in it",
                    report.playlist.name
                );
            }
            match report.commit {
                CommitOutcome::Added { count } => println!(
                    "Added {} items to '{}' ({} seeds from {} saved tracks, {} episodes)",
                    count,
                    report.playlist.name,
                    report.seed_count,
                    report.saved_track_count,
                    report.episode_count
                ),
                CommitOutcome::Skipped => {
                    println!("Nothing to add to '{}'", report.playlist.name)
                }
                CommitOutcome::Failed => log::warn!(
                    "Adding tracks to '{}' failed, the playlist is incomplete",
                    report.playlist.name
                ),
            }
            println!("{}", report.playlist.id);
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                log::info!("Default config at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
