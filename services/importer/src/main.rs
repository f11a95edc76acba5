//! Importer CLI - Replaces the movie JSON store with a CSV export
//!
//! Usage:
//!   cargo run --bin importer -- --csv movies.csv
//!   cargo run --bin importer -- --csv movies.csv --out data/movies.json --dry-run

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use importer::{write_json, Dialect, Importer};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "importer", about = "Imports a movie CSV export into the JSON store")]
struct Args {
    /// CSV file to import
    #[arg(long)]
    csv: PathBuf,

    /// JSON store to replace
    #[arg(long, default_value = "data/movies.json")]
    out: PathBuf,

    /// Dry run - parse and report without writing
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Treat doubled quotes inside quoted fields as a literal quote
    #[arg(long, default_value = "false")]
    rfc4180: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let dialect = if args.rfc4180 {
        Dialect::Rfc4180
    } else {
        Dialect::Simple
    };
    let importer = Importer::new(dialect);

    println!("=== CineVerse Importer ===");
    println!("Source: {}", args.csv.display());
    println!("Mode: {}", if args.dry_run { "dry-run" } else { "live" });

    let report = importer
        .parse_file(&args.csv)
        .with_context(|| format!("Failed to parse {}", args.csv.display()))?;

    println!("\nParsed {} movies total", report.movies.len());
    for (i, movie) in report.movies.iter().take(3).enumerate() {
        println!(
            "  [{}] {} | {} | {}",
            i + 1,
            movie.get("title").and_then(|v| v.as_str()).unwrap_or("?"),
            movie
                .get("year")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            movie.get("category").and_then(|v| v.as_str()).unwrap_or("-"),
        );
    }
    if report.movies.len() > 3 {
        println!("  ... and {} more", report.movies.len() - 3);
    }
    if !report.skipped.is_empty() {
        println!("Skipped {} rows", report.skipped.len());
    }

    if args.dry_run {
        println!("\nDry run - {} left untouched", args.out.display());
        return Ok(());
    }

    write_json(&report.movies, &args.out)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!(
        "Imported {} movies to {}",
        report.movies.len(),
        args.out.display()
    );

    println!("\n=== Import Complete ===");
    Ok(())
}
