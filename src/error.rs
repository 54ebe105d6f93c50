//! Error types for the rowport transfer pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`SourceError`] - table reading errors (defined in [`crate::source`])
//! - [`MappingError`] - column mapping errors
//! - [`MatchError`] - matcher configuration errors
//! - [`SinkError`] - destination sink errors
//! - [`RegistryError`] - mapping template registry errors
//! - [`TransferError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

pub use crate::source::SourceError;

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors around the column mapping document.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Failed to read the mapping file.
    #[error("Failed to read mapping file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid mapping JSON.
    #[error("Invalid mapping JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Mapping references source columns that the source table lacks.
    #[error("Mapping references missing source columns: {}", .0.join(", "))]
    MissingSourceColumns(Vec<String>),

    /// Mapping routes to destination columns the destination table lacks.
    #[error("Mapping routes to missing destination columns: {}", .0.join(", "))]
    MissingDestColumns(Vec<String>),

    /// Every entry is excluded; nothing would ever be written.
    #[error("Mapping routes no column to the destination")]
    NoRoutedColumns,
}

// =============================================================================
// Matcher Errors
// =============================================================================

/// Errors building a matcher from configuration.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The configured time pattern is not a valid regex.
    #[error("Invalid time pattern '{pattern}': {message}")]
    InvalidTimePattern { pattern: String, message: String },

    /// No monitored column configured.
    #[error("No monitored column configured")]
    NoMonitoredColumns,

    /// Failed to read the match configuration file.
    #[error("Failed to read match config: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid match configuration JSON.
    #[error("Invalid match config JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors from the destination table sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to open or parse the existing destination file.
    #[error("Cannot open destination: {0}")]
    OpenError(#[from] SourceError),

    /// A destination row carries a column the sink has no header for.
    #[error("Unknown destination column: {0}")]
    UnknownColumn(String),

    /// Failed to persist the destination file. Appended rows are lost;
    /// the file on disk keeps its pre-run content.
    #[error("Failed to save destination: {0}")]
    SaveError(std::io::Error),

    /// CSV (de)serialization failed.
    #[error("Destination CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors from the mapping template registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Template not found.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Invalid template data.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// IO error.
    #[error("Registry IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Registry JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Transfer Errors (top-level)
// =============================================================================

/// Top-level transfer orchestration errors.
///
/// This is the main error type returned by [`crate::transfer::run_transfer`].
/// It wraps all lower-level errors and adds run-specific variants.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Source table error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Mapping error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Matcher configuration error.
    #[error("Matcher error: {0}")]
    Match(#[from] MatchError),

    /// Destination sink error.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Registry error.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for matcher operations.
pub type MatchResult<T> = Result<T, MatchError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;
