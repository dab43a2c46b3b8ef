use dotenvy::dotenv;
use hotel_desk::{
    api::{self, AppState},
    config::{app::load_default_config, database, rate_plans::seed_rate_plans},
    core::clock::SystemClock,
    errors::Result,
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = load_default_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed configured rate plans (if missing)
    let clock = Arc::new(SystemClock);
    seed_rate_plans(&db, clock.as_ref(), &app_config.rate_plans)
        .await
        .inspect_err(|e| error!("Failed to seed rate plans: {}", e))?;

    // 6. Serve the API; BIND_ADDR wins over config.toml
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| app_config.server.bind_addr.clone());
    let app = api::router(AppState::new(db, clock, app_config));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_addr, e))?;
    info!(%bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed, the server runs until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C signal"),
        Err(e) => {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
