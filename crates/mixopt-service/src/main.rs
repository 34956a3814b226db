//! MixOpt Service Binary
//!
//! Marketing mix budget optimization over fitted saturation curves

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mixopt_service::{api::create_router, MixOptService, ServiceConfig, SERVICE_VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting MixOpt Service v{}", SERVICE_VERSION);

    let config = ServiceConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let service = Arc::new(MixOptService::new(&config));
    info!(
        "Optimizer defaults: population={}, generations={}, diversification_weight={}",
        config.optimizer.population_size,
        config.optimizer.generations,
        config.optimizer.diversification_weight
    );
    info!(
        "Store limits: max_curves={}, max_stored_runs={}",
        config.store.max_curves, config.store.max_stored_runs
    );

    let app = create_router(service);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API listening on {}", addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Shutting down MixOpt service");
    Ok(())
}
