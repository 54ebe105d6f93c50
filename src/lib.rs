//! # Rowport - keyword-filtered row transfer between spreadsheet tables
//!
//! Rowport copies selected rows from a source table into a destination
//! table. Rows qualify when designated "monitored" columns contain status
//! keywords (clock-time tokens never count); a user-supplied column mapping
//! decides how each included row is projected into the destination columns.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Source file │────▶│   Matcher   │────▶│  Assembler  │────▶│  Dest file  │
//! │ (auto-enc)  │     │ (keywords)  │     │  (mapping)  │     │  (append)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rowport::{run_transfer, CsvSink, MatchConfig, ColumnMapping, ConsoleProgress, TransferOptions};
//!
//! let table = rowport::read_table_file("export.csv")?;
//! let mapping = ColumnMapping::from_file("mapping.json")?;
//! let mut sink = CsvSink::open("followup.csv")?;
//! let config = MatchConfig { monitored_columns: vec!["Status".into()], ..Default::default() };
//!
//! let summary = run_transfer(&table, &mut sink, &mapping, &config,
//!     &mut ConsoleProgress::default(), &TransferOptions::default())?;
//! println!("Inserted {} rows", summary.rows_inserted);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`source`] - Table reading with encoding/delimiter auto-detection
//! - [`mapping`] - Column mapping document and template registry
//! - [`matcher`] - Keyword matching and text extraction
//! - [`transfer`] - Row assembly and the run controller
//! - [`sink`] - Destination table sinks
//! - [`logs`] - Console logging

pub mod error;
pub mod logs;
pub mod mapping;
pub mod matcher;
pub mod sink;
pub mod source;
pub mod transfer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    MappingError, MatchError, RegistryError, SinkError, SourceError, TransferError,
};

// =============================================================================
// Re-exports - Source reading
// =============================================================================

pub use source::{
    detect_delimiter, detect_encoding, parse_table, read_table_bytes, read_table_file, TableData,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{example_mapping, ColumnMapping, MappingEntry};
pub use mapping::registry::{MappingRegistry, StoredMapping};

// =============================================================================
// Re-exports - Matcher
// =============================================================================

pub use matcher::{MatchConfig, MatchOutcome, Matcher, DEFAULT_KEYWORDS, DEFAULT_TIME_PATTERN};

// =============================================================================
// Re-exports - Transfer
// =============================================================================

pub use transfer::assemble::{assemble, DestinationRow};
pub use transfer::pipeline::{
    preview_matches, run_transfer, ConsoleProgress, ProgressSink, SilentProgress, TransferOptions,
    TransferSummary,
};

// =============================================================================
// Re-exports - Sinks
// =============================================================================

pub use sink::{CsvSink, MemorySink, TableSink};
