//! TrackIt scraping service
//!
//! Serves `GET /track?tracking=<id>` backed by the postal portal scraper.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trackit::{error::Result, models::Config, server};

#[derive(Parser, Debug)]
#[command(name = "trackit-scraper", version, about = "Postal portal scraping service")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "trackit.toml")]
    config: PathBuf,

    /// Emit JSON log records
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let config = Config::load_or_default(&args.config);
    config.validate()?;

    server::run(&config).await
}
