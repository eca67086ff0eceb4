//! TrackIt CLI
//!
//! Local execution entry point. For the scraping service, use `trackit-scraper`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use trackit::{
    error::{AppError, Result},
    models::{Config, Coordinates, KNOWN_CARRIERS},
    pipeline::{self, EstimateMode, TrackOptions},
    utils::http,
};

/// TrackIt - Parcel Tracking
#[derive(Parser, Debug)]
#[command(
    name = "trackit",
    version,
    about = "Detects parcel carriers, tracks shipments and estimates delivery times"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "trackit.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Position of the recipient.
#[derive(Args, Debug)]
struct Position {
    /// Latitude in decimal degrees
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

impl Position {
    fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track a shipment
    Track {
        /// Tracking number
        number: String,

        /// Carrier code chosen manually (skips detection)
        #[arg(long)]
        carrier: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Also estimate the arrival date
        #[arg(long)]
        estimate: bool,

        #[command(flatten)]
        position: Position,
    },

    /// Detect the carrier of a tracking number
    Detect {
        /// Tracking number
        number: String,
    },

    /// Estimate the delivery time for a package location
    Estimate {
        /// Current package location, e.g. "Basel Sortierzentrum"
        #[arg(long)]
        location: String,

        #[command(flatten)]
        position: Position,

        /// Use only the offline location table
        #[arg(long, conflicts_with = "schedule")]
        demo: bool,

        /// Estimate an arrival date instead of a travel time
        #[arg(long)]
        schedule: bool,
    },

    /// Scrape the postal portal directly and print the JSON payload
    Scrape {
        /// Tracking number
        number: String,
    },

    /// List carriers that can be chosen manually
    Carriers,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Track {
            number,
            carrier,
            json,
            estimate,
            position,
        } => {
            let client = http::create_async_client(&config.http)?;
            let estimate_from = estimate
                .then(|| position.coordinates().unwrap_or_else(|| config.estimate.user_fallback()));
            let options = TrackOptions {
                carrier,
                json,
                estimate_from,
            };
            pipeline::run_track(&config, &client, &number, &options).await?;
        }

        Command::Detect { number } => {
            let client = http::create_async_client(&config.http)?;
            pipeline::run_detect(&config, &client, &number).await?;
        }

        Command::Estimate {
            location,
            position,
            demo,
            schedule,
        } => {
            let mode = if demo {
                EstimateMode::Demo
            } else if schedule {
                EstimateMode::Schedule
            } else {
                EstimateMode::Travel
            };
            let client = http::create_async_client(&config.http)?;
            pipeline::run_estimate(&config, &client, &location, position.coordinates(), mode)
                .await?;
        }

        Command::Scrape { number } => {
            if number.trim().is_empty() {
                return Err(AppError::validation("Trackingnummer fehlt"));
            }
            pipeline::run_scrape(&config, &number).await?;
        }

        Command::Carriers => {
            for carrier in KNOWN_CARRIERS {
                println!("{:<14} {}", carrier.code, carrier.name);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            pipeline::run_validate(&config)?;
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
