//! Load collection rows from CSV or JSON files.
//!
//! CSV input gets encoding and delimiter auto-detection; cells are typed so
//! numeric columns sort numerically. JSON input must be an array of objects.

use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Number, Value};
use std::path::Path;

use crate::error::{RowsError, RowsResult};
use crate::models::Record;

/// Rows plus what was detected while reading them.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub records: Vec<Record>,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
}

/// Read rows from `path`: `.json` as a JSON array, anything else as CSV.
pub fn load_rows(path: &Path) -> RowsResult<Vec<Record>> {
    let bytes = std::fs::read(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let content = String::from_utf8_lossy(&bytes);
        parse_json_rows(&content)
    } else {
        Ok(parse_bytes_auto(&bytes)?.records)
    }
}

/// Parse a JSON array of objects.
pub fn parse_json_rows(content: &str) -> RowsResult<Vec<Record>> {
    if content.trim().is_empty() {
        return Err(RowsError::EmptyFile);
    }

    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(RowsError::NotRecords(json_kind(&value).to_string()));
    };

    items
        .into_iter()
        .map(|item| {
            let kind = json_kind(&item);
            Record::from_value(item).ok_or_else(|| RowsError::NotRecords(format!("array of {}", kind)))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with `encoding`, falling back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Pick the separator occurring most often in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = (',', 0);
    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best.1 {
            best = (sep, count);
        }
    }
    best.0
}

/// Parse CSV bytes with encoding and delimiter auto-detection.
pub fn parse_bytes_auto(bytes: &[u8]) -> RowsResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_csv_str(&content, delimiter, encoding)
}

/// Parse CSV text with an explicit delimiter.
pub fn parse_csv_str(content: &str, delimiter: char, encoding: String) -> RowsResult<ParseResult> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Err(RowsError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(RowsError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        if row.iter().all(str::is_empty) {
            continue;
        }

        let mut fields = Map::new();
        for (i, header) in headers.iter().enumerate() {
            fields.insert(header.clone(), infer_scalar(row.get(i).unwrap_or("")));
        }
        records.push(Record::from(fields));
    }

    Ok(ParseResult { records, encoding, delimiter, headers })
}

fn csv_error(err: csv::Error) -> RowsError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    RowsError::Csv { line, message: err.to_string() }
}

/// Type a raw cell: empty → null, booleans, numbers, otherwise a string.
///
/// Values with a leading zero (`"007"`) stay strings.
pub fn infer_scalar(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    match raw.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let leading_zero = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    if leading_zero {
        return Value::String(raw.to_string());
    }

    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}
