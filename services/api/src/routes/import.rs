//! `/api/import` - replace the movie store from a CSV export.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "csvfile";

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Deserialize)]
struct PathImportRequest {
    #[serde(rename = "csvPath", default)]
    csv_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub skipped: usize,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/csv", post(import_upload))
        .route("/path", post(import_path))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Accept `text/csv` (parameters such as `charset` ignored) or a `.csv` name.
fn is_csv(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let essence = content_type.and_then(|ct| ct.split(';').next()).map(str::trim);
    essence.is_some_and(|e| e.eq_ignore_ascii_case("text/csv"))
        || file_name.is_some_and(|n| n.ends_with(".csv"))
}

/// Run the blocking import against the configured movie store.
async fn run_import(state: &AppState, csv_path: PathBuf) -> Result<ImportResponse, ApiError> {
    let importer = state.importer;
    let json_path = state.movies.path().to_path_buf();

    let report = tokio::task::spawn_blocking(move || importer.import_to_json(&csv_path, &json_path))
        .await
        .context("Import task failed")??;

    let count = report.movies.len();
    Ok(ImportResponse {
        success: true,
        message: format!("Successfully imported {} movies", count),
        count,
        skipped: report.skipped.len(),
    })
}

async fn import_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut upload: Option<PathBuf> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if !is_csv(field.content_type(), field.file_name()) {
            return Err(ApiError::bad_request("Only CSV files are allowed"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        fs::create_dir_all(&state.config.uploads_dir)
            .await
            .context("Failed to create uploads directory")?;
        let path = state.config.uploads_dir.join(format!(
            "upload-{}-{}.csv",
            Utc::now().timestamp_millis(),
            UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to store upload at {}", path.display()))?;
        info!("Stored CSV upload ({} bytes) at {}", bytes.len(), path.display());
        upload = Some(path);
        break;
    }

    let Some(path) = upload else {
        return Err(ApiError::bad_request("No CSV file uploaded"));
    };

    let result = run_import(&state, path.clone()).await;
    if let Err(e) = fs::remove_file(&path).await {
        warn!("Failed to remove upload {}: {}", path.display(), e);
    }
    result.map(Json)
}

async fn import_path(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PathImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let path = match req.csv_path.filter(|p| !p.is_empty()).map(PathBuf::from) {
        Some(p) if fs::try_exists(&p).await.unwrap_or(false) => p,
        _ => return Err(ApiError::bad_request("Invalid CSV file path")),
    };

    run_import(&state, path).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Some("text/csv"), Some("movies.txt")));
        assert!(is_csv(Some("application/octet-stream"), Some("movies.csv")));
        assert!(is_csv(None, Some("movies.csv")));
        assert!(!is_csv(Some("application/json"), Some("movies.json")));
        assert!(!is_csv(None, None));
    }

    #[test]
    fn test_is_csv_ignores_parameters() {
        assert!(is_csv(Some("text/csv; charset=utf-8"), Some("export.txt")));
        assert!(is_csv(Some("Text/CSV"), None));
        assert!(!is_csv(Some("text/csvx"), Some("export.txt")));
    }
}
