//! Pumpkinfest RSVP
//!
//! Backend that keeps guest RSVPs in a loosely-labelled sheet and photos in a
//! shared folder, plus the client-side state manager that talks to it.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod mapper;
pub mod models;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::{DriveStore, SheetRepository};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<SheetRepository>,
    pub drive: Arc<DriveStore>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Base64 inflates the photo by a third; leave room for the JSON around it
    let body_limit = state.config.max_upload_bytes / 3 * 4 + 64 * 1024;

    let api_routes = Router::new()
        .route("/exec", get(api::exec_get).post(api::exec_post))
        .route("/files/{id}", get(api::serve_file))
        .route("/files/{id}/view", get(api::serve_file))
        .route("/files/{id}/thumbnail", get(api::serve_thumbnail));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
