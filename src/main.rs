use anyhow::Context;
use dotenv::dotenv;
use tracing::{info, warn};

use training_backend::{
    app::create_router,
    app_state::AppState,
    config,
    db::{self, repositories::SessionRepository},
    telemetry::{init_telemetry, TelemetryConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init()?;
    let telemetry = init_telemetry(TelemetryConfig::from_config(config))?;

    let pool = db::init_pool(&config.database).await?;

    if let Some(every) = config.session_cleanup_interval() {
        let pool = pool.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match SessionRepository::purge_expired(&pool).await {
                    Ok(0) => {}
                    Ok(purged) => info!(purged, "Expired sessions purged"),
                    Err(e) => warn!(error = %e, "Session purge failed"),
                }
            }
        });
    }

    let app = create_router(AppState::new(pool, config.clone()));

    let addr = config.server_addr();
    info!("{} listening on {}", config.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
