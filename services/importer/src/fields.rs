//! Header canonicalization and value coercion.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::{Number, Value};

/// Known export column names and the canonical field each maps to.
static HEADER_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ID", "id"),
        ("id", "id"),
        ("Rank", "rank"),
        ("rank", "rank"),
        ("Title", "title"),
        ("title", "title"),
        ("Year", "year"),
        ("year", "year"),
        ("Industry", "category"),
        ("industry", "category"),
        ("Category", "category"),
        ("category", "category"),
        ("Genre", "genres"),
        ("genre", "genres"),
        ("Genres", "genres"),
        ("IMDb_Rating", "imdb_rating"),
        ("imdb_rating", "imdb_rating"),
        ("Director", "director"),
        ("director", "director"),
        ("Cast", "cast"),
        ("cast", "cast"),
        ("Worldwide_Gross_USD", "worldwide_gross_usd"),
        ("worldwide_gross_usd", "worldwide_gross_usd"),
        ("Worldwide_Gross_INR", "worldwide_gross_inr"),
        ("worldwide_gross_inr", "worldwide_gross_inr"),
        ("Language", "language"),
        ("language", "language"),
        ("Poster_URL", "poster_url"),
        ("poster_url", "poster_url"),
        ("Trailer_URL", "trailer_url"),
        ("trailer_url", "trailer_url"),
        ("Description", "description"),
        ("description", "description"),
        ("Movie_URL", "source_urls"),
        ("movie_url", "source_urls"),
        ("Source_URL", "source_urls"),
        ("source_url", "source_urls"),
        ("Country", "country"),
        ("country", "country"),
        ("Runtime", "runtime"),
        ("runtime", "runtime"),
        ("Certificate", "certificate"),
        ("certificate", "certificate"),
        ("Budget_INR", "budget_inr"),
        ("budget_inr", "budget_inr"),
        ("Budget_USD", "budget_usd"),
        ("budget_usd", "budget_usd"),
        ("Profit_INR", "profit_inr"),
        ("profit_inr", "profit_inr"),
        ("Awards", "awards"),
        ("awards", "awards"),
        ("Release_Date", "release_date"),
        ("release_date", "release_date"),
        ("Domestic_Gross_USD", "domestic_gross_usd"),
        ("domestic_gross_usd", "domestic_gross_usd"),
        ("Domestic_Gross_INR", "domestic_gross_inr"),
        ("domestic_gross_inr", "domestic_gross_inr"),
    ])
});

/// Substrings that mark a money column.
const NUMERIC_MARKERS: [&str; 3] = ["gross", "budget", "profit"];
/// Exact canonical names that are always numeric.
const NUMERIC_FIELDS: [&str; 4] = ["id", "rank", "year", "imdb_rating"];
const LIST_FIELDS: [&str; 2] = ["genres", "source_urls"];
const MISSING_MARKERS: [&str; 2] = ["N/A", "NA"];

/// Map a raw CSV header to its canonical field name.
///
/// Unknown headers fall back to lower case with whitespace runs replaced by
/// `_` (`"Box Office"` becomes `"box_office"`).
pub fn canonical_header(header: &str) -> Cow<'static, str> {
    if let Some(name) = HEADER_MAP.get(header) {
        return Cow::Borrowed(*name);
    }

    let mut out = String::with_capacity(header.len());
    let mut in_space = false;
    for c in header.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    Cow::Owned(out)
}

/// Trim a cell and drop one surrounding quote on each side.
pub fn clean_cell(raw: &str) -> &str {
    let value = raw.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

pub fn is_numeric_field(canonical: &str) -> bool {
    NUMERIC_FIELDS.contains(&canonical) || NUMERIC_MARKERS.iter().any(|m| canonical.contains(m))
}

/// Coerce an already cleaned cell for the given canonical field.
///
/// `None` means the field is left out of the record. `false` and `0` are real
/// values and come back as `Some`.
pub fn coerce_value(canonical: &str, value: &str) -> Option<Value> {
    if value.trim().is_empty() || MISSING_MARKERS.contains(&value) {
        return None;
    }

    if is_numeric_field(canonical) {
        let digits: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        return parse_leading_float(&digits).and_then(number_value);
    }

    if LIST_FIELDS.contains(&canonical) {
        let items: Vec<Value> = if value.contains(',') {
            value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.to_string()))
                .collect()
        } else {
            vec![Value::String(value.to_string())]
        };
        return Some(Value::Array(items));
    }

    if canonical == "release_date" {
        return Some(Value::String(value.to_string()));
    }

    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }

    Some(Value::String(value.to_string()))
}

/// Canonicalize a header and coerce its raw cell in one step.
pub fn map_field(header: &str, raw: &str) -> Option<(Cow<'static, str>, Value)> {
    let canonical = canonical_header(header);
    let value = coerce_value(&canonical, clean_cell(raw))?;
    Some((canonical, value))
}

/// Parse the longest leading decimal number, the way a browser's
/// `parseFloat` reads `"12.5-3"` as `12.5`. Input is already restricted to
/// digits, `.` and `-`.
fn parse_leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - end - 1;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

/// Whole numbers are stored as JSON integers so `2020` stays `2020`.
pub fn number_value(n: f64) -> Option<Value> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -------------------------------------------------------------------------
    // HEADER TESTS
    // -------------------------------------------------------------------------

    #[test]
    fn test_known_headers_both_casings() {
        assert_eq!(canonical_header("Industry"), "category");
        assert_eq!(canonical_header("industry"), "category");
        assert_eq!(canonical_header("Movie_URL"), "source_urls");
        assert_eq!(canonical_header("IMDb_Rating"), "imdb_rating");
    }

    #[test]
    fn test_unknown_header_fallback() {
        assert_eq!(canonical_header("Box Office"), "box_office");
        assert_eq!(canonical_header("Opening  \tWeekend"), "opening_weekend");
        assert_eq!(canonical_header("TITLE"), "title");
    }

    #[test]
    fn test_clean_cell_strips_one_quote_each_side() {
        assert_eq!(clean_cell(r#"  "Inception"  "#), "Inception");
        assert_eq!(clean_cell(r#""""#), "");
        assert_eq!(clean_cell("plain"), "plain");
    }

    // -------------------------------------------------------------------------
    // NUMERIC COERCION TESTS
    // -------------------------------------------------------------------------

    #[test]
    fn test_currency_budget() {
        assert_eq!(coerce_value("budget_usd", "$1,234.50"), Some(json!(1234.5)));
    }

    #[test]
    fn test_missing_markers_omit() {
        assert_eq!(coerce_value("budget_usd", "N/A"), None);
        assert_eq!(coerce_value("title", "NA"), None);
        assert_eq!(coerce_value("title", "   "), None);
        assert_eq!(coerce_value("title", ""), None);
    }

    #[test]
    fn test_non_numeric_text_omits() {
        assert_eq!(coerce_value("worldwide_gross_usd", "abc"), None);
        assert_eq!(coerce_value("year", "-"), None);
    }

    #[test]
    fn test_whole_numbers_are_integers() {
        assert_eq!(coerce_value("year", "2020"), Some(json!(2020)));
        assert_eq!(
            coerce_value("worldwide_gross_usd", "1,000,000"),
            Some(json!(1000000))
        );
        assert!(coerce_value("year", "2020").unwrap().is_i64());
    }

    #[test]
    fn test_zero_is_kept() {
        assert_eq!(coerce_value("profit_inr", "0"), Some(json!(0)));
    }

    #[test]
    fn test_negative_profit() {
        assert_eq!(coerce_value("profit_inr", "-250.75"), Some(json!(-250.75)));
    }

    #[test]
    fn test_leading_number_wins() {
        // The slash is stripped before parsing, so "8.8/10" reads as 8.810.
        assert_eq!(coerce_value("imdb_rating", "8.8/10"), Some(json!(8.81)));
        assert_eq!(coerce_value("rank", "12-3"), Some(json!(12)));
        assert_eq!(coerce_value("rank", "1.2.3"), Some(json!(1.2)));
    }

    #[test]
    fn test_number_value_shapes() {
        assert!(number_value(5100.0).unwrap().is_i64());
        assert_eq!(number_value(-3.0), Some(json!(-3)));
        assert_eq!(number_value(2.5), Some(json!(2.5)));
        assert_eq!(number_value(f64::NAN), None);
    }

    #[test]
    fn test_fractional_rating() {
        assert_eq!(coerce_value("imdb_rating", "7.5"), Some(json!(7.5)));
        assert_eq!(coerce_value("imdb_rating", ".5"), Some(json!(0.5)));
    }

    // -------------------------------------------------------------------------
    // LIST / BOOLEAN / STRING TESTS
    // -------------------------------------------------------------------------

    #[test]
    fn test_genres_split_and_trimmed() {
        assert_eq!(
            coerce_value("genres", "Action, Drama"),
            Some(json!(["Action", "Drama"]))
        );
        assert_eq!(coerce_value("genres", "Action"), Some(json!(["Action"])));
    }

    #[test]
    fn test_source_urls_drop_empty_pieces() {
        assert_eq!(
            coerce_value("source_urls", "http://a, ,http://b,"),
            Some(json!(["http://a", "http://b"]))
        );
    }

    #[test]
    fn test_release_date_passthrough() {
        assert_eq!(
            coerce_value("release_date", "2010-07-16"),
            Some(json!("2010-07-16"))
        );
    }

    #[test]
    fn test_booleans() {
        assert_eq!(coerce_value("awards", "TRUE"), Some(json!(true)));
        assert_eq!(coerce_value("awards", "false"), Some(json!(false)));
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(
            coerce_value("director", "Christopher Nolan"),
            Some(json!("Christopher Nolan"))
        );
    }

    #[test]
    fn test_map_field_uses_canonical_name() {
        let (name, value) = map_field("Industry", " \"Bollywood\" ").unwrap();
        assert_eq!(name, "category");
        assert_eq!(value, json!("Bollywood"));

        let (name, value) = map_field("Genre", "Action, Drama").unwrap();
        assert_eq!(name, "genres");
        assert_eq!(value, json!(["Action", "Drama"]));

        assert!(map_field("Budget_USD", "N/A").is_none());
    }
}
