//! Delimited-text table reader with encoding and delimiter auto-detection.
//!
//! Turns an exported spreadsheet (CSV/TSV) into a [`TableData`]: ordered
//! column headers plus rows addressable by column name. No transfer logic
//! lives here.

use serde_json::{json, Map, Value};
use std::path::Path;

/// Table reading error with line context
#[derive(Debug, Clone)]
pub struct SourceError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "Line {}: {}", self.line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for SourceError {}

impl SourceError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A parsed table with read metadata
#[derive(Debug, Clone)]
pub struct TableData {
    /// Column headers in file order
    pub headers: Vec<String>,
    /// Rows as JSON objects keyed by header
    pub rows: Vec<Value>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl TableData {
    /// Number of data rows (headers excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" | "latin9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        // encoding_rs follows the Encoding Standard, where latin-1 labels
        // resolve to windows-1252 (a superset of ISO-8859-1)
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        "iso-8859-15" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        // UTF-8 and anything unrecognized: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse table content with an explicit delimiter.
///
/// Each row becomes a JSON object keyed by column header. Empty lines are
/// skipped; short rows are padded with empty strings; extra cells beyond
/// the headers are dropped.
///
/// # Example
/// ```ignore
/// use rowport::source::parse_table;
///
/// let table = parse_table("Name,Status\nAlice,No CNG", ',', "utf-8".into()).unwrap();
/// assert_eq!(table.rows[0]["Status"], "No CNG");
/// ```
pub fn parse_table(content: &str, delimiter: char, encoding: String) -> Result<TableData, SourceError> {
    let mut lines = content.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| SourceError::new(1, "Empty table file"))?;

    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::new(1, "No headers found"));
    }

    let mut rows = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(delimiter).collect();
        let mut obj = Map::new();

        for (i, header) in headers.iter().enumerate() {
            let raw_value = values
                .get(i)
                .map(|s| s.trim().trim_matches('"'))
                .unwrap_or("");

            obj.insert(header.clone(), json!(raw_value));
        }

        rows.push(Value::Object(obj));
    }

    Ok(TableData {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

/// Read a table from bytes with auto-detection of encoding and delimiter.
pub fn read_table_bytes(bytes: &[u8]) -> Result<TableData, SourceError> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_table(&content, delimiter, encoding)
}

/// Read a table file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let table = read_table_file("status_export.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", table.encoding, table.delimiter);
/// println!("Rows: {}", table.row_count());
/// ```
pub fn read_table_file<P: AsRef<Path>>(path: P) -> Result<TableData, SourceError> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|e| SourceError::new(0, format!("Cannot read file '{}': {}", path.as_ref().display(), e)))?;

    read_table_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_table() {
        let table = parse_table("Name;Status\nAlice;No CNG\nBob;OK", ';', "utf-8".into()).unwrap();

        assert_eq!(table.headers, vec!["Name", "Status"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Name"], "Alice");
        assert_eq!(table.rows[0]["Status"], "No CNG");
        assert_eq!(table.rows[1]["Status"], "OK");
    }

    #[test]
    fn test_comma_delimiter() {
        let table = parse_table("a,b,c\n1,2,3", ',', "utf-8".into()).unwrap();

        assert_eq!(table.rows[0]["a"], "1");
        assert_eq!(table.rows[0]["b"], "2");
        assert_eq!(table.rows[0]["c"], "3");
    }

    #[test]
    fn test_quoted_values() {
        let table = parse_table("name;value\n\"Alice\";\"Hello World\"", ';', "utf-8".into()).unwrap();

        assert_eq!(table.rows[0]["name"], "Alice");
        assert_eq!(table.rows[0]["value"], "Hello World");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_table("a;b\n1;2\n\n3;4\n", ';', "utf-8".into()).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_missing_values_padded() {
        let table = parse_table("a;b;c\n1;;3", ';', "utf-8".into()).unwrap();

        assert_eq!(table.rows[0]["a"], "1");
        assert_eq!(table.rows[0]["b"], "");
        assert_eq!(table.rows[0]["c"], "3");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let table = parse_table("a;b\n1;2;3;4", ';', "utf-8".into()).unwrap();

        assert_eq!(table.rows[0]["a"], "1");
        assert_eq!(table.rows[0]["b"], "2");
        assert!(table.rows[0].get("c").is_none());
    }

    #[test]
    fn test_empty_content_error() {
        let result = parse_table("", ';', "utf-8".into());
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Empty"));
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_auto_read() {
        let table = read_table_bytes("name;status\nAlice;Emailed".as_bytes()).unwrap();

        assert_eq!(table.delimiter, ';');
        assert_eq!(table.encoding, "utf-8");
        assert_eq!(table.headers, vec!["name", "status"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_and_latin9_differ() {
        // 0xA4 is the currency sign in ISO-8859-1 but the euro in -15
        assert_eq!(decode_content(&[0xA4], "iso-8859-1"), "\u{a4}");
        assert_eq!(decode_content(&[0xA4], "iso-8859-15"), "€");
    }

    #[test]
    fn test_error_display_with_line() {
        let err = SourceError::new(3, "bad row");
        assert!(err.to_string().contains("Line 3"));
    }
}
