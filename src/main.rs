use anyhow::Result;
use clap::Parser;
use job_scout::cli::{self, Cli};
use job_scout::{logging, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    logging::init(&config.log)?;

    info!("Starting jobscout v{}", env!("CARGO_PKG_VERSION"));
    match &config.source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file, using defaults and environment"),
    }
    cli::run(cli, config).await
}
