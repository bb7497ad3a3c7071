//! persona-chat HTTP server.
//!
//! Exposes the chat pipeline over axum: `GET /` for liveness and
//! `POST /chat` for chat turns.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/chat", post(routes::chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
