//! CSV → JSON movie import.
//!
//! The whole file is read, every row is normalized in memory, ids are
//! renumbered by output position, and only then is the destination written.
//! Nothing reaches the destination unless the full collection was built.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::UTF_8;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{ImportError, Result};
use crate::fields;
use crate::tokenizer::Dialect;

/// One normalized movie, keyed by canonical field name in column order.
pub type Movie = Map<String, Value>;

/// Fields a record must carry to be kept.
pub const REQUIRED_FIELDS: [&str; 2] = ["id", "title"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    ColumnCount { expected: usize, found: usize },
    MissingRequired,
}

/// A data line that did not make it into the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the source text.
    pub line: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub movies: Vec<Movie>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Importer {
    dialect: Dialect,
}

impl Importer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse CSV text into renumbered movie records.
    ///
    /// This function is DETERMINISTIC: same text = same records.
    pub fn parse_str(&self, content: &str) -> Result<ImportReport> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut lines = content
            .split('\n')
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((header_line, header)) = lines.next() else {
            return Err(ImportError::Empty);
        };
        let headers = self
            .dialect
            .header(header)
            .map_err(|source| ImportError::Tokenize {
                line: header_line,
                source,
            })?;
        debug!("Headers on line {}: {:?}", header_line, headers);

        let mut report = ImportReport::default();

        for (line, text) in lines {
            let values = self
                .dialect
                .tokenize(text)
                .map_err(|source| ImportError::Tokenize { line, source })?;

            if values.len() != headers.len() {
                warn!(
                    "Skipping line {}: column count mismatch (expected {}, found {})",
                    line,
                    headers.len(),
                    values.len()
                );
                report.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::ColumnCount {
                        expected: headers.len(),
                        found: values.len(),
                    },
                });
                continue;
            }

            let mut movie = Movie::new();
            for (header, raw) in headers.iter().zip(&values) {
                if let Some((name, value)) = fields::map_field(header, raw) {
                    movie.insert(name.into_owned(), value);
                }
            }

            if REQUIRED_FIELDS.iter().all(|f| movie.contains_key(*f)) {
                report.movies.push(movie);
            } else {
                debug!("Skipping line {}: missing id or title", line);
                report.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::MissingRequired,
                });
            }
        }

        renumber(&mut report.movies);
        Ok(report)
    }

    /// Read and parse a CSV file. Input is decoded as UTF-8 with any BOM
    /// removed; invalid byte sequences become U+FFFD.
    pub fn parse_file(&self, path: &Path) -> Result<ImportReport> {
        let bytes = fs::read(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Content size: {} bytes", bytes.len());

        let (content, had_errors) = UTF_8.decode_with_bom_removal(&bytes);
        if had_errors {
            warn!(
                "{} is not valid UTF-8; invalid sequences were replaced",
                path.display()
            );
        }
        self.parse_str(&content)
    }

    /// Parse `csv_path` and replace the JSON store at `json_path` with the
    /// result.
    pub fn import_to_json(&self, csv_path: &Path, json_path: &Path) -> Result<ImportReport> {
        info!("Importing CSV from: {}", csv_path.display());
        let report = self.parse_file(csv_path)?;
        write_json(&report.movies, json_path)?;
        info!(
            "Imported {} movies to {} ({} rows skipped)",
            report.movies.len(),
            json_path.display(),
            report.skipped.len()
        );
        Ok(report)
    }
}

/// Import with the default dialect and return the stored movies.
pub fn import_csv_to_json(csv_path: &Path, json_path: &Path) -> Result<Vec<Movie>> {
    Importer::default()
        .import_to_json(csv_path, json_path)
        .map(|report| report.movies)
}

/// Overwrite every id with the record's 1-based position.
pub fn renumber(movies: &mut [Movie]) {
    for (idx, movie) in movies.iter_mut().enumerate() {
        movie.insert("id".to_string(), Value::from(idx as u64 + 1));
    }
}

/// Serialize the collection as pretty JSON and swap it into place.
///
/// The text goes to a sibling temp file first and is renamed over `path`,
/// so a failed write never leaves a truncated store behind.
pub fn write_json(movies: &[Movie], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(movies)?;

    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ImportError::Write { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err(parent))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(write_err(&tmp))?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(ImportError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "movies.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(csv: &str) -> ImportReport {
        Importer::default().parse_str(csv).unwrap()
    }

    // -------------------------------------------------------------------------
    // END TO END
    // -------------------------------------------------------------------------

    #[test]
    fn test_sample_film_scenario() {
        let csv = "ID,Title,Year,Industry,Worldwide_Gross_USD\n\
                   7,Sample Film,2020,Hollywood,\"1,000,000\"\n";
        let report = parse(csv);

        assert_eq!(report.movies.len(), 1);
        assert_eq!(
            Value::Object(report.movies[0].clone()),
            json!({
                "id": 1,
                "title": "Sample Film",
                "year": 2020,
                "category": "Hollywood",
                "worldwide_gross_usd": 1000000
            })
        );
    }

    #[test]
    fn test_fields_keep_column_order() {
        let report = parse("Title,ID,Year\nHeat,3,1995\n");
        let keys: Vec<&str> = report.movies[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "id", "year"]);
    }

    // -------------------------------------------------------------------------
    // RENUMBERING
    // -------------------------------------------------------------------------

    #[test]
    fn test_ids_follow_output_position() {
        let csv = "ID,Title\n40,A\n12,B\n99,C\n";
        let report = parse(csv);
        let ids: Vec<i64> = report
            .movies
            .iter()
            .map(|m| m["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_ids_dense_after_dropped_rows() {
        let csv = "ID,Title\n5,A\n6\n7,\n8,D\n";
        let report = parse(csv);
        assert_eq!(report.movies.len(), 2);
        assert_eq!(report.movies[0]["title"], "A");
        assert_eq!(report.movies[0]["id"], 1);
        assert_eq!(report.movies[1]["title"], "D");
        assert_eq!(report.movies[1]["id"], 2);
    }

    // -------------------------------------------------------------------------
    // DROPPED ROWS
    // -------------------------------------------------------------------------

    #[test]
    fn test_column_count_mismatch_skipped() {
        let csv = "ID,Title,Year\n1,Too,Many,Cells\n2,Ok,2001\n3,Short\n";
        let report = parse(csv);

        assert_eq!(report.movies.len(), 1);
        assert_eq!(report.movies[0]["title"], "Ok");
        assert_eq!(
            report.skipped,
            vec![
                SkippedRow {
                    line: 2,
                    reason: SkipReason::ColumnCount {
                        expected: 3,
                        found: 4
                    },
                },
                SkippedRow {
                    line: 4,
                    reason: SkipReason::ColumnCount {
                        expected: 3,
                        found: 2
                    },
                },
            ]
        );
    }

    #[test]
    fn test_missing_title_or_id_dropped() {
        let csv = "ID,Title\nN/A,No Id\n2,NA\nabc,Bad Id\n4,Kept\n";
        let report = parse(csv);

        assert_eq!(report.movies.len(), 1);
        assert_eq!(report.movies[0]["title"], "Kept");
        assert!(report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::MissingRequired));
        assert_eq!(report.skipped.len(), 3);
    }

    #[test]
    fn test_zero_id_is_present() {
        let report = parse("ID,Title\n0,Zero\n");
        assert_eq!(report.movies.len(), 1);
        assert_eq!(report.movies[0]["id"], 1);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let csv = "\r\nID,Title,Genre\r\n\r\n1,Dune,\"Sci-Fi, Adventure\"\r\n   \n";
        let report = parse(csv);
        assert_eq!(report.movies.len(), 1);
        assert_eq!(report.movies[0]["genres"], json!(["Sci-Fi", "Adventure"]));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = Importer::default().parse_str(" \n\n").unwrap_err();
        assert!(matches!(err, ImportError::Empty));
    }

    #[test]
    fn test_header_only_yields_no_movies() {
        let report = parse("ID,Title\n");
        assert!(report.movies.is_empty());
    }

    #[test]
    fn test_bom_is_ignored() {
        let report = parse("\u{feff}ID,Title\n1,Heat\n");
        assert_eq!(report.movies[0]["title"], "Heat");
    }

    #[test]
    fn test_rfc4180_dialect_unescapes_quotes() {
        let csv = "ID,Title\n1,\"Say \"\"Hi\"\", Now\"\n";
        let report = Importer::new(Dialect::Rfc4180).parse_str(csv).unwrap();
        assert_eq!(report.movies[0]["title"], "Say \"Hi\", Now");

        let report = Importer::new(Dialect::Simple).parse_str(csv).unwrap();
        assert_eq!(report.movies[0]["title"], "Say Hi, Now");
    }

    #[test]
    fn test_unknown_columns_fall_back() {
        let report = parse("ID,Title,Box Office,Streaming\n1,Up,big,TRUE\n");
        assert_eq!(report.movies[0]["box_office"], "big");
        assert_eq!(report.movies[0]["streaming"], true);
    }

    // -------------------------------------------------------------------------
    // FILE IMPORT
    // -------------------------------------------------------------------------

    #[test]
    fn test_import_writes_pretty_json_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("movies.csv");
        fs::write(&csv_path, "ID,Title,Year\n9,Heat,1995\n").unwrap();
        let json_path = dir.path().join("nested/data/movies.json");

        let movies = import_csv_to_json(&csv_path, &json_path).unwrap();
        assert_eq!(movies.len(), 1);

        let written = fs::read_to_string(&json_path).unwrap();
        assert_eq!(
            written,
            "[\n  {\n    \"id\": 1,\n    \"title\": \"Heat\",\n    \"year\": 1995\n  }\n]"
        );
        assert!(!dir.path().join("nested/data/.movies.json.tmp").exists());
    }

    #[test]
    fn test_import_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("movies.csv");
        fs::write(
            &csv_path,
            "Rank,Title,Genre,Budget_USD\n1,A,\"Action, Drama\",$100\n2,B,Comedy,N/A\n",
        )
        .unwrap();
        let json_path = dir.path().join("movies.json");

        import_csv_to_json(&csv_path, &json_path).unwrap();
        let first = fs::read(&json_path).unwrap();
        import_csv_to_json(&csv_path, &json_path).unwrap();
        let second = fs::read(&json_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_import_replaces_previous_collection() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("movies.json");
        fs::write(&json_path, r#"[{"id":1,"title":"Old"},{"id":2,"title":"Older"}]"#).unwrap();
        let csv_path = dir.path().join("movies.csv");
        fs::write(&csv_path, "ID,Title\n1,New\n").unwrap();

        import_csv_to_json(&csv_path, &json_path).unwrap();
        let stored: Vec<Movie> =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["title"], "New");
    }

    #[test]
    fn test_failed_import_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("movies.json");
        fs::write(&json_path, "[]").unwrap();

        let empty = dir.path().join("empty.csv");
        fs::write(&empty, "\n\n").unwrap();
        assert!(matches!(
            import_csv_to_json(&empty, &json_path),
            Err(ImportError::Empty)
        ));

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            import_csv_to_json(&missing, &json_path),
            Err(ImportError::Read { .. })
        ));

        assert_eq!(fs::read_to_string(&json_path).unwrap(), "[]");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("latin1.csv");
        fs::write(&csv_path, b"ID,Title\n1,Am\xe9lie\n").unwrap();

        let report = Importer::default().parse_file(&csv_path).unwrap();
        assert_eq!(report.movies[0]["title"], "Am\u{fffd}lie");
    }
}
