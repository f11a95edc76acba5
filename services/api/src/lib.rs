//! API Service - REST backend for the CineVerse movie database
//!
//! Endpoints:
//! - GET /health - Health check
//! - /api/movies - List, look up, create, update and delete movies
//! - /api/contact - Submit and list contact messages
//! - /api/auth/login - Admin login
//! - /api/stats - Summary and per-industry statistics
//! - /api/import - Replace the movie store from a CSV export
//!
//! Anything else is served from the static frontend directory.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use importer::Importer;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::JsonStore;

pub struct AppState {
    pub config: Config,
    pub movies: JsonStore,
    pub contacts: JsonStore,
    pub importer: Importer,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            movies: JsonStore::new(config.movies_path()),
            contacts: JsonStore::new(config.contacts_path()),
            importer: Importer::new(config.csv_dialect),
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    // CORS for the browser frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let frontend = ServeDir::new(&state.config.public_dir);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/movies", routes::movies::routes())
        .nest("/api/contact", routes::contact::routes())
        .nest("/api/auth", routes::auth::routes())
        .nest("/api/stats", routes::stats::routes())
        .nest("/api/import", routes::import::routes())
        .fallback_service(frontend)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
