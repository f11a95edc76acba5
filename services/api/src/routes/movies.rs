//! `/api/movies` - CRUD over the movie collection.

use std::cmp::Ordering;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use importer::Movie;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::routes::timestamp;
use crate::store::next_id;
use crate::AppState;

const TOP_N: usize = 10;

pub fn routes() -> Router<Arc<AppState>> {
    // Static segments are matched before `/:id`.
    Router::new()
        .route("/", get(list_movies).post(create_movie))
        .route("/top10", get(top10_movies))
        .route("/category/:category", get(movies_by_category))
        .route("/categories/:category", get(movies_by_category))
        .route(
            "/:id",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
}

/// Numeric id of a stored movie, accepting whole floats.
pub fn movie_id(movie: &Movie) -> Option<i64> {
    let id = movie.get("id")?;
    id.as_i64().or_else(|| {
        id.as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Worldwide gross used for ranking; zero and missing values don't count.
fn ranking_gross(movie: &Movie) -> Option<f64> {
    ["worldwide_gross_usd", "worldwideGross"]
        .iter()
        .filter_map(|key| movie.get(*key).and_then(Value::as_f64))
        .find(|g| *g != 0.0)
}

pub fn top_grossing(movies: Vec<Movie>, n: usize) -> Vec<Movie> {
    let mut ranked: Vec<(f64, Movie)> = movies
        .into_iter()
        .filter_map(|m| ranking_gross(&m).map(|g| (g, m)))
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(n).map(|(_, m)| m).collect()
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse().map_err(|_| movie_not_found())
}

fn movie_not_found() -> ApiError {
    ApiError::not_found("Movie not found")
}

fn into_object(body: Value) -> Result<Movie, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

async fn list_movies(State(state): State<Arc<AppState>>) -> Json<Vec<Movie>> {
    Json(state.movies.load_or_empty().await)
}

async fn top10_movies(State(state): State<Arc<AppState>>) -> Json<Vec<Movie>> {
    Json(top_grossing(state.movies.load_or_empty().await, TOP_N))
}

async fn movies_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Json<Vec<Movie>> {
    let movies: Vec<Movie> = state.movies.load_or_empty().await;
    let filtered = movies
        .into_iter()
        .filter(|m| {
            m.get("category")
                .and_then(Value::as_str)
                .is_some_and(|c| c.to_lowercase() == category.to_lowercase())
        })
        .collect();
    Json(filtered)
}

async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    let id = parse_id(&id)?;
    let movies: Vec<Movie> = state.movies.load_or_empty().await;
    movies
        .into_iter()
        .find(|m| movie_id(m) == Some(id))
        .map(Json)
        .ok_or_else(movie_not_found)
}

async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body = into_object(body)?;
    let mut movies: Vec<Movie> = state.movies.load().await?;

    let mut movie = Movie::new();
    movie.insert(
        "id".to_string(),
        Value::from(next_id(movies.iter().filter_map(movie_id))),
    );
    movie.extend(body.into_iter().filter(|(k, _)| k != "id"));
    movie.insert("createdAt".to_string(), Value::String(timestamp()));

    movies.push(movie.clone());
    state.movies.save(&movies).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Movie>, ApiError> {
    let id = parse_id(&id)?;
    let body = into_object(body)?;
    let mut movies: Vec<Movie> = state.movies.load().await?;

    let movie = movies
        .iter_mut()
        .find(|m| movie_id(m) == Some(id))
        .ok_or_else(movie_not_found)?;
    movie.extend(body.into_iter().filter(|(k, _)| k != "id"));
    movie.insert("updatedAt".to_string(), Value::String(timestamp()));
    let updated = movie.clone();

    state.movies.save(&movies).await?;
    Ok(Json(updated))
}

async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let movies: Vec<Movie> = state.movies.load().await?;
    let before = movies.len();

    let remaining: Vec<Movie> = movies
        .into_iter()
        .filter(|m| movie_id(m) != Some(id))
        .collect();
    if remaining.len() == before {
        return Err(movie_not_found());
    }

    state.movies.save(&remaining).await?;
    Ok(Json(json!({ "message": "Movie deleted successfully" })))
}
