use std::{error::Error, sync::Arc};

use tasks_server::{
    app_state::{AppState, SharedState},
    data_access::data_context::DataContext,
    map_routes,
    settings::Settings,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // ── Settings + logging ─────────────────────────────────────
    let loaded = Settings::load()?;
    let settings = loaded.clone().unwrap_or_default();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if loaded.is_none() {
        tracing::warn!(path = %Settings::path().display(), "no settings file, using defaults");
    }

    // ── Open the database ──────────────────────────────────────
    // Tables are created here, before the listener accepts anything.
    let data_context = DataContext::new(&settings.database_path)?;
    tracing::info!(
        path = %settings.database_path,
        tasks = data_context.count_tasks()?,
        "database ready"
    );

    let state: SharedState = Arc::new(AppState { data_context });
    let app = map_routes(state);

    // ── Start ──────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(settings.socket_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
