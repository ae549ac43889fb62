use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icsap_dash::{api, config, AdmissionRepository, Dashboard};
use svckit::database::WarehouseDriver;

#[derive(Parser, Debug)]
#[command(name = "icsap-dash")]
#[command(about = "ICSAP hospital admissions dashboard over SIH admission grains")]
struct Args {
    #[arg(short, long, default_value = "config/icsap-dash.yaml")]
    config: String,

    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Serve seeded synthetic data instead of querying the warehouse
    #[arg(long)]
    demo: bool,

    /// Read rows from a JSON fixture file instead of the warehouse
    #[arg(long, conflicts_with = "demo")]
    fixture: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = config::load_config(&args.config)?;
    if args.demo {
        config.warehouse.driver = WarehouseDriver::Demo;
    }
    if let Some(path) = args.fixture {
        config.warehouse.driver = WarehouseDriver::Fixture;
        config.warehouse.fixture_path = Some(path);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.observability.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ICSAP dashboard on port {} ({:?} driver)",
        args.port, config.warehouse.driver
    );

    let repository = AdmissionRepository::from_config(&config.warehouse)
        .context("failed to initialize admissions repository")?;
    let dashboard = Arc::new(Dashboard::new(Arc::new(repository), config.dashboard));

    // Warm the cache; a cold warehouse is reported per request instead.
    match dashboard.refresh().await {
        Ok(rows) => info!("Warmed dataset cache with {} grains", rows),
        Err(e) => warn!("Initial data load failed: {}", e),
    }

    api::start_server(dashboard, args.port).await?;

    Ok(())
}
