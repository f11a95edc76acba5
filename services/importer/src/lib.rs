//! Movie CSV importer
//!
//! Turns a movie CSV export into the JSON collection served by the API:
//! - Tokenize each line (quote-aware, comma separated)
//! - Map export headers to canonical field names
//! - Coerce cells into numbers, lists, booleans or strings
//! - Renumber ids by position and replace the JSON store in one write

pub mod error;
pub mod fields;
pub mod import;
pub mod tokenizer;

pub use error::{ImportError, Result};
pub use import::{
    import_csv_to_json, write_json, ImportReport, Importer, Movie, SkipReason, SkippedRow,
};
pub use tokenizer::Dialect;
