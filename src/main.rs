mod config;
mod logging;
mod ports;
mod report;
mod spotify;
mod store;
mod sync;
mod youtube;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};
use colored::Colorize;

use crate::config::Config;
use crate::logging::setup_logging;
use crate::report::ConsoleReporter;
use crate::spotify::SpotifyClient;
use crate::spotify::auth::client_credentials_token;
use crate::store::PlaylistStore;
use crate::sync::{SyncEngine, SyncFatal, SyncOptions};
use crate::youtube::YoutubeClient;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_PORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: off)
    #[arg(long, default_value = "off", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLAYLIST_PORTER_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transfer the configured Spotify playlist into the Youtube playlist
    Sync {
        /// Override the configured Spotify playlist URL or ID
        #[arg(long)]
        spotify_playlist: Option<String>,

        /// Override the configured Youtube playlist URL or ID
        #[arg(long)]
        youtube_playlist: Option<String>,
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

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("playlist-porter starting");

    match args.command {
        Commands::Sync {
            spotify_playlist,
            youtube_playlist,
        } => {
            let mut config = {
                if let Some(path) = args.config {
                    Config::from_file(&path)
                } else {
                    Config::load()
                }
            }
            .with_context(|| "Failed to load playlist-porter config")?;

            if let Some(url) = spotify_playlist {
                config.spotify.playlist_url = url;
            }
            if let Some(url) = youtube_playlist {
                config.youtube.playlist_url = url;
            }

            run_sync(config).await?;
        }
        Commands::Config(config_command) => match config_command {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("Config at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}

async fn run_sync(config: Config) -> Result<()> {
    let spotify_playlist_id = config.spotify_playlist_id();
    let youtube_playlist_id = config.youtube_playlist_id();

    log::debug!("Authenticating with Spotify");
    let token = client_credentials_token(&config.spotify.client_id, &config.spotify.client_secret)
        .await
        .wrap_err("Spotify authentication failed")?;
    let spotify = SpotifyClient::new(token.access_token);
    println!("Spotify authentication successful.");

    let playlist = spotify
        .get_playlist(&spotify_playlist_id)
        .await
        .wrap_err("Failed to fetch Spotify playlist details")?;
    log::info!("Transferring playlist '{}'", playlist.name);

    let tracks = spotify
        .playlist_track_keys(&spotify_playlist_id)
        .await
        .wrap_err("Failed to fetch Spotify playlist tracks")?;
    println!(
        "{}",
        format!("Total tracks retrieved: {}", tracks.len()).yellow()
    );

    let mut store = PlaylistStore::open(
        &config.state_dir_path(),
        &playlist.name,
        &spotify_playlist_id,
    )
    .wrap_err_with(|| format!("Failed to open the state folder for '{}'", playlist.name))?;

    let youtube = YoutubeClient::new(&config.youtube)?;
    let options = SyncOptions {
        delay: config.transfer_delay(),
        ..SyncOptions::default()
    };

    let mut reporter = ConsoleReporter::new();
    let mut engine = SyncEngine::new(&youtube, &mut store, &mut reporter, options);
    let result = engine.run(&tracks, &youtube_playlist_id).await;

    match result {
        Ok(summary) => {
            log::info!(
                "Sync complete: {} added, {} skipped, {} failed first pass, {} recovered on retry",
                summary.added,
                summary.skipped,
                summary.first_pass_failures,
                summary.recovered
            );
            println!("{}", "Transfer complete!".green().bold());
            Ok(())
        }
        Err(fatal) => {
            // The engine never terminates the process itself; this is the
            // one place that maps fatal outcomes to an exit code.
            report_fatal(&fatal, &store);
            std::process::exit(1);
        }
    }
}

fn report_fatal(fatal: &SyncFatal, store: &PlaylistStore) {
    log::error!("Sync aborted: {}", fatal);

    match fatal {
        SyncFatal::AuthFailure => {
            eprintln!(
                "{} {}",
                "Error:".red().bold(),
                "the Youtube 'Cookie' value in the config file is invalid or missing."
            );
            eprintln!("Update the 'Cookie' in the config file and run the sync again.");
        }
        SyncFatal::RateLimited => {
            eprintln!(
                "{} {}",
                "Error:".red().bold(),
                "rate limit exceeded (429)."
            );
            eprintln!(
                "Wait and try again later, or update the Youtube 'Cookie' value in the config file."
            );
        }
        SyncFatal::TooManyFailures { failed } => {
            eprintln!(
                "{} {}",
                "Error:".red().bold(),
                format!("too many failures encountered ({}).", failed)
            );
            eprintln!("Check your configuration and retry.");
        }
        SyncFatal::Unresolved { remaining } => {
            eprintln!(
                "{} {}",
                "Error:".red().bold(),
                format!(
                    "{} tracks could not be added; they were saved to {}.",
                    remaining,
                    store.unresolved_file().display()
                )
            );
            eprintln!("Refresh the 'Cookie' in the config file and run the sync again.");
        }
        SyncFatal::Store(error) => {
            eprintln!(
                "{} {}",
                "Error:".red().bold(),
                format!("failed to persist transfer state: {}", error)
            );
        }
    }
}
