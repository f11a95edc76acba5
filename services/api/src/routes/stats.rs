//! `/api/stats` - summary figures for the analytics dashboard.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use importer::fields::number_value;
use importer::Movie;
use serde::Serialize;
use serde_json::Value;

use crate::AppState;

pub const INDUSTRIES: [&str; 3] = ["Hollywood", "Bollywood", "Tollywood"];

/// Fixed conversion used when a movie only carries a USD budget.
pub const INR_PER_USD: f64 = 83.0;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_movies: usize,
    #[serde(rename = "totalRevenueUSD")]
    pub total_revenue_usd: Value,
    #[serde(rename = "totalRevenueINR")]
    pub total_revenue_inr: Value,
    pub avg_rating: String,
    #[serde(rename = "totalBudgetUSD")]
    pub total_budget_usd: Value,
    #[serde(rename = "totalBudgetINR")]
    pub total_budget_inr: Value,
    pub industries: IndustryCounts,
    pub year_range: YearRange,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct IndustryCounts {
    #[serde(rename = "Hollywood")]
    pub hollywood: usize,
    #[serde(rename = "Bollywood")]
    pub bollywood: usize,
    #[serde(rename = "Tollywood")]
    pub tollywood: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct YearRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryStats {
    pub industry: &'static str,
    pub count: usize,
    #[serde(rename = "revenueUSD")]
    pub revenue_usd: Value,
    #[serde(rename = "revenueINR")]
    pub revenue_inr: Value,
    pub avg_rating: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(summary_handler))
        .route("/industries", get(industries_handler))
}

/// Numeric field or 0 when missing or not a number.
fn num(movie: &Movie, key: &str) -> f64 {
    movie.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn sum(movies: &[&Movie], key: &str) -> f64 {
    movies.iter().map(|m| num(m, key)).sum()
}

/// Totals go out as integers when whole, like the imported figures.
fn total(n: f64) -> Value {
    number_value(n).unwrap_or(Value::Null)
}

fn avg_rating(movies: &[&Movie]) -> String {
    if movies.is_empty() {
        return "0.00".to_string();
    }
    format!("{:.2}", sum(movies, "imdb_rating") / movies.len() as f64)
}

fn budget_inr(movie: &Movie) -> f64 {
    match num(movie, "budget_inr") {
        b if b != 0.0 => b,
        _ => num(movie, "budget_usd") * INR_PER_USD,
    }
}

fn in_industry<'a>(movies: &'a [Movie], industry: &str) -> Vec<&'a Movie> {
    movies
        .iter()
        .filter(|m| m.get("category").and_then(Value::as_str) == Some(industry))
        .collect()
}

pub fn summarize(movies: &[Movie]) -> StatsSummary {
    let all: Vec<&Movie> = movies.iter().collect();
    let years: Vec<i64> = movies
        .iter()
        .filter_map(|m| m.get("year").and_then(Value::as_i64))
        .filter(|y| *y != 0)
        .collect();

    StatsSummary {
        total_movies: movies.len(),
        total_revenue_usd: total(sum(&all, "worldwide_gross_usd")),
        total_revenue_inr: total(sum(&all, "worldwide_gross_inr")),
        avg_rating: avg_rating(&all),
        total_budget_usd: total(sum(&all, "budget_usd")),
        total_budget_inr: total(movies.iter().map(budget_inr).sum()),
        industries: IndustryCounts {
            hollywood: in_industry(movies, "Hollywood").len(),
            bollywood: in_industry(movies, "Bollywood").len(),
            tollywood: in_industry(movies, "Tollywood").len(),
        },
        year_range: YearRange {
            min: years.iter().copied().min(),
            max: years.iter().copied().max(),
        },
    }
}

pub fn industry_breakdown(movies: &[Movie]) -> Vec<IndustryStats> {
    INDUSTRIES
        .iter()
        .map(|&industry| {
            let members = in_industry(movies, industry);
            IndustryStats {
                industry,
                count: members.len(),
                revenue_usd: total(sum(&members, "worldwide_gross_usd")),
                revenue_inr: total(sum(&members, "worldwide_gross_inr")),
                avg_rating: avg_rating(&members),
            }
        })
        .collect()
}

async fn summary_handler(State(state): State<Arc<AppState>>) -> Json<StatsSummary> {
    let movies: Vec<Movie> = state.movies.load_or_empty().await;
    Json(summarize(&movies))
}

async fn industries_handler(State(state): State<Arc<AppState>>) -> Json<Vec<IndustryStats>> {
    let movies: Vec<Movie> = state.movies.load_or_empty().await;
    Json(industry_breakdown(&movies))
}
