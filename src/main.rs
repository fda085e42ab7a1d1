use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use sekolah::router::init_router;
use sekolah::state::AppState;
use sekolah_config::{CorsConfig, DatabaseConfig, ServerConfig, SessionConfig};
use sekolah_db::{init_db_pool, run_migrations};
use sekolah_observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let database_config = DatabaseConfig::from_env()?;
    let server_config = ServerConfig::from_env();

    let pool = init_db_pool(&database_config)
        .await
        .context("Failed to connect to database")?;
    if database_config.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    let state = AppState::new(pool.clone(), SessionConfig::from_env(), CorsConfig::from_env())
        .with_metrics(init_metrics());
    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Server listening");
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
