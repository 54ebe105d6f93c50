//! Destination table sink.
//!
//! The destination file doubles as input (existing headers and row count)
//! and output (the appended rows). [`CsvSink`] loads the whole file up
//! front, accepts appends in memory, and persists everything in one save at
//! end-of-run: a failed save loses the appended rows but never leaves a
//! half-written file behind. [`MemorySink`] backs pipeline tests and
//! previews.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SinkError, SinkResult};
use crate::source::{decode_content, detect_delimiter, detect_encoding, SourceError};
use crate::transfer::assemble::DestinationRow;

/// Where included rows are appended.
///
/// The write cursor is owned by the sink and advances exactly once per
/// append; rows land at consecutive indices after the pre-existing ones.
pub trait TableSink {
    /// Destination column headers, in file order.
    fn headers(&self) -> &[String];

    /// Current number of data rows, appended rows included.
    fn row_count(&self) -> usize;

    /// Append a destination row at the next free index; returns that index
    /// (0-based, headers excluded).
    fn append(&mut self, row: &DestinationRow) -> SinkResult<usize>;

    /// Persist all appends. The only fatal mid-run failure lives here.
    fn save(&mut self) -> SinkResult<()>;
}

// =============================================================================
// File-backed sink
// =============================================================================

/// Delimited-text file sink.
pub struct CsvSink {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Map<String, Value>>,
    delimiter: char,
}

impl CsvSink {
    /// Open an existing destination file, loading its headers and rows.
    ///
    /// Reading goes through the csv crate rather than the plain source
    /// splitter: the sink's own saves quote fields with embedded
    /// delimiters, and those must round-trip across runs.
    pub fn open<P: AsRef<Path>>(path: P) -> SinkResult<Self> {
        let bytes = fs::read(path.as_ref()).map_err(|e| {
            SourceError::new(0, format!("Cannot read file '{}': {}", path.as_ref().display(), e))
        })?;
        let encoding = detect_encoding(&bytes);
        let content = decode_content(&bytes, &encoding);
        let delimiter = detect_delimiter(&content);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SourceError::new(1, "No headers found").into());
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row = Map::new();
            // Cells are kept verbatim; a re-save must not alter rows the
            // run never touched.
            for (i, header) in headers.iter().enumerate() {
                let cell = record.get(i).unwrap_or("");
                row.insert(header.clone(), Value::String(cell.to_string()));
            }
            rows.push(row);
        }

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            headers,
            rows,
            delimiter,
        })
    }

    fn cell_string(value: Option<&Value>) -> String {
        match value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }
}

impl TableSink for CsvSink {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn append(&mut self, row: &DestinationRow) -> SinkResult<usize> {
        if let Some(unknown) = row.keys().find(|k| !self.headers.contains(k)) {
            return Err(SinkError::UnknownColumn(unknown.clone()));
        }

        self.rows.push(row.clone());
        Ok(self.rows.len() - 1)
    }

    fn save(&mut self) -> SinkResult<()> {
        // Write a sibling temp file first, then rename over the original,
        // so a failed save leaves the destination with its pre-run content.
        let tmp_path = self.path.with_extension("tmp");

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter as u8)
            .from_path(&tmp_path)?;

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            let record: Vec<String> = self
                .headers
                .iter()
                .map(|h| Self::cell_string(row.get(h)))
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush().map_err(SinkError::SaveError)?;
        drop(writer);

        fs::rename(&tmp_path, &self.path).map_err(SinkError::SaveError)
    }
}

// =============================================================================
// In-memory sink
// =============================================================================

/// In-memory sink for tests and dry previews.
pub struct MemorySink {
    headers: Vec<String>,
    rows: Vec<DestinationRow>,
    saved: bool,
}

impl MemorySink {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            saved: false,
        }
    }

    /// Seed pre-existing rows (the destination's prior content).
    pub fn with_rows(mut self, rows: Vec<DestinationRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn rows(&self) -> &[DestinationRow] {
        &self.rows
    }

    pub fn was_saved(&self) -> bool {
        self.saved
    }
}

impl TableSink for MemorySink {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn append(&mut self, row: &DestinationRow) -> SinkResult<usize> {
        if let Some(unknown) = row.keys().find(|k| !self.headers.contains(k)) {
            return Err(SinkError::UnknownColumn(unknown.clone()));
        }
        self.rows.push(row.clone());
        Ok(self.rows.len() - 1)
    }

    fn save(&mut self) -> SinkResult<()> {
        self.saved = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn dest_row(cells: Value) -> DestinationRow {
        cells.as_object().unwrap().clone()
    }

    #[test]
    fn test_open_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dest.csv");
        fs::write(&path, "Location,Date,Notes\nDowntown,2024-01-05,ok\n").unwrap();

        let sink = CsvSink::open(&path).unwrap();
        assert_eq!(sink.headers(), &["Location", "Date", "Notes"]);
        assert_eq!(sink.row_count(), 1);
    }

    #[test]
    fn test_append_and_save_preserves_existing_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dest.csv");
        fs::write(&path, "Location,Notes\nDowntown,ok\n").unwrap();

        let mut sink = CsvSink::open(&path).unwrap();
        let idx = sink
            .append(&dest_row(json!({ "Notes": "No CNG, 14:30" })))
            .unwrap();
        assert_eq!(idx, 1);
        sink.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Location,Notes");
        assert_eq!(lines[1], "Downtown,ok");
        // Unmapped cell written blank at the new index only; quoting added
        // for the embedded comma
        assert_eq!(lines[2], ",\"No CNG, 14:30\"");
    }

    #[test]
    fn test_append_unknown_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dest.csv");
        fs::write(&path, "Location\n").unwrap();

        let mut sink = CsvSink::open(&path).unwrap();
        let result = sink.append(&dest_row(json!({ "Nope": "x" })));
        assert!(matches!(result, Err(SinkError::UnknownColumn(_))));
    }

    #[test]
    fn test_save_keeps_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dest.csv");
        fs::write(&path, "a;b\n1;2\n").unwrap();

        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&dest_row(json!({ "a": "3", "b": "4" }))).unwrap();
        sink.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("3;4"));
    }

    #[test]
    fn test_failed_save_leaves_destination_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dest.csv");
        let original = "Location,Notes\nDowntown,ok\n";
        fs::write(&path, original).unwrap();

        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&dest_row(json!({ "Notes": "No CNG" }))).unwrap();

        // Block the sibling temp file so the save fails before the rename
        fs::create_dir(path.with_extension("tmp")).unwrap();
        assert!(sink.save().is_err());

        // Destination keeps its pre-run content, no partial write
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, original);
    }

    #[test]
    fn test_save_preserves_cell_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dest.csv");
        fs::write(&path, "Location,Notes\n\" Downtown \",ok\n").unwrap();

        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&dest_row(json!({ "Notes": "No CNG" }))).unwrap();
        sink.save().unwrap();

        // The untouched row's padded cell survives the round-trip
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(" Downtown "));
    }

    #[test]
    fn test_open_missing_file() {
        let result = CsvSink::open("/nonexistent/dest.csv");
        assert!(matches!(result, Err(SinkError::OpenError(_))));
    }

    #[test]
    fn test_memory_sink_indices() {
        let mut sink = MemorySink::new(vec!["Notes".to_string()])
            .with_rows(vec![dest_row(json!({ "Notes": "existing" }))]);

        assert_eq!(sink.row_count(), 1);
        assert_eq!(sink.append(&dest_row(json!({ "Notes": "a" }))).unwrap(), 1);
        assert_eq!(sink.append(&dest_row(json!({ "Notes": "b" }))).unwrap(), 2);
        assert!(!sink.was_saved());
        sink.save().unwrap();
        assert!(sink.was_saved());
    }
}
