use persona_chat_core::Result;
use persona_chat_server::{app, config::ServerConfig, error::StartupError, state::AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let config = ServerConfig::load().map_err(|e| StartupError::Config {
        reason: e.to_string(),
    })?;
    tracing::info!("Loaded configuration");

    let state = Arc::new(AppState::from_config(&config)?);
    if state.spawn_session_eviction().is_some() {
        tracing::info!(
            idle_ttl_minutes = config.session.idle_ttl_minutes,
            "Idle session eviction enabled"
        );
    }

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.listen_addr.clone(),
            reason: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            reason: e.to_string(),
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
