//! `/api/auth` - single configured admin account, no sessions.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let admin = &state.config.admin;
    let valid = req.username.as_deref() == Some(admin.username.as_str())
        && req.password.as_deref() == Some(admin.password.as_str());

    if valid {
        (
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                message: "Login successful",
                token: Some(format!("admin-token-{}", Utc::now().timestamp_millis())),
            }),
        )
    } else {
        warn!("Rejected admin login for {:?}", req.username);
        (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse {
                success: false,
                message: "Invalid credentials",
                token: None,
            }),
        )
    }
}
