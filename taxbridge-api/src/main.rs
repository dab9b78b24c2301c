//! # TaxBridge API Server
//!
//! Multi-tenant invoicing backend for Pakistani businesses: tenants
//! register, manage buyers, draft invoices and submit them to FBR's
//! Digital Invoicing API.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taxbridge-api
//! ```

use std::sync::Arc;

use taxbridge_api::{
    app::{build_router, AppState},
    config::Config,
};
use taxbridge_shared::{db, fbr::FbrClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taxbridge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaxBridge API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = db::create_pool(db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let fbr = Arc::new(FbrClient::new()?);

    let state = AppState::new(pool, config.clone(), fbr);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
