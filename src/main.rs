use std::sync::Arc;

use anyhow::Context;
use lesson_booking_service::{
    adapters::{
        database::{establish, lazy::LazyDatabase},
        http::{router, OriginAllowList},
    },
    commands::DomainLogic,
    config::Config,
    telemetry,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.log_format);

    // Serve right away; data endpoints report internal errors until the store is installed
    let database = Arc::new(LazyDatabase::new());
    tokio::spawn({
        let config = config.clone();
        let database = database.clone();
        async move { establish(&config, &database).await }
    });

    let app = router(
        DomainLogic::new(database),
        OriginAllowList::new(config.allowed_origins.iter().cloned()),
    );

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
