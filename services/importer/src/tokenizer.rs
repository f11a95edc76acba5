//! Line tokenizer for movie CSV exports.
//!
//! The default dialect is a plain quote toggle: a `"` flips the "inside
//! quotes" state and is dropped, and a comma only separates fields while
//! outside quotes. Doubled quotes are NOT an escaped literal quote in this
//! dialect, each one toggles. Files that rely on `""` escaping can opt into
//! [`Dialect::Rfc4180`], which hands the line to the `csv` crate instead.

/// Field separator shared by both dialects.
pub const SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Quote-toggling tokenizer, no escape handling.
    #[default]
    Simple,
    /// RFC 4180 quoting (`""` inside a quoted field is one literal quote).
    Rfc4180,
}

impl Dialect {
    /// Split one data line into its fields.
    pub fn tokenize(self, line: &str) -> Result<Vec<String>, csv::Error> {
        match self {
            Dialect::Simple => Ok(split_quoted(line)),
            Dialect::Rfc4180 => split_rfc4180(line),
        }
    }

    /// Split the header line into cleaned column names.
    ///
    /// The simple dialect does not honour quotes in the header: it splits on
    /// every comma and strips all quote characters from each name.
    pub fn header(self, line: &str) -> Result<Vec<String>, csv::Error> {
        match self {
            Dialect::Simple => Ok(line
                .split(SEPARATOR)
                .map(|h| h.trim().replace('"', ""))
                .collect()),
            Dialect::Rfc4180 => Ok(split_rfc4180(line)?
                .into_iter()
                .map(|h| h.trim().to_string())
                .collect()),
        }
    }
}

/// Quote-toggling split used by [`Dialect::Simple`].
pub fn split_quoted(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            SEPARATOR if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

fn split_rfc4180(line: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .double_quote(true)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    if reader.read_record(&mut record)? {
        Ok(record.iter().map(str::to_string).collect())
    } else {
        // The csv reader yields no record for an empty line; keep the
        // one-empty-field shape of the simple dialect.
        Ok(vec![String::new()])
    }
}
