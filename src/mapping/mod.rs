//! Column mapping definition.
//!
//! The mapping is the user's declaration of how source columns route to
//! destination columns. It is built before a run (by hand, or reused from
//! the template registry) and never mutated by the pipeline. Entry order is
//! significant: when two monitored source columns route to the same
//! destination column, their extracted text is concatenated in entry order.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MappingError, MappingResult};

pub mod registry;

/// A complete column mapping, serializable as a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnMapping {
    /// Version of the mapping format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Ordered routing entries, one per source column
    pub entries: Vec<MappingEntry>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Routing for a single source column.
///
/// `dest: None` is the explicit "exclude this column" sentinel: the source
/// column's values never reach the destination, even when it is monitored
/// and matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingEntry {
    /// Source column name
    pub source: String,

    /// Destination column name, or `null` to exclude
    #[serde(default)]
    pub dest: Option<String>,
}

impl MappingEntry {
    /// Route a source column to a destination column.
    pub fn route(source: &str, dest: &str) -> Self {
        Self {
            source: source.to_string(),
            dest: Some(dest.to_string()),
        }
    }

    /// Exclude a source column.
    pub fn exclude(source: &str) -> Self {
        Self {
            source: source.to_string(),
            dest: None,
        }
    }
}

impl ColumnMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self {
            version: default_version(),
            description: String::new(),
            entries: Vec::new(),
        }
    }

    /// Parse a mapping from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a mapping from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> MappingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Add an entry, builder-style
    pub fn with_entry(mut self, entry: MappingEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Entries that actually route to a destination, in mapping order
    pub fn routed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|e| e.dest.as_deref().map(|d| (e.source.as_str(), d)))
    }

    /// All source columns named by the mapping
    pub fn source_columns(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.source.clone()).collect()
    }

    /// All destination columns routed to, deduplicated, in first-use order
    pub fn dest_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for (_, dest) in self.routed() {
            if !columns.iter().any(|c| c == dest) {
                columns.push(dest.to_string());
            }
        }
        columns
    }

    /// Destination column for a source column, if routed
    pub fn dest_for(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.source == source)
            .and_then(|e| e.dest.as_deref())
    }

    /// Monitored columns that are actually routed by this mapping.
    ///
    /// A column is only monitored while the mapping routes it somewhere;
    /// an absent or excluded entry disables monitoring for that column.
    pub fn active_monitored(&self, monitored: &[String]) -> Vec<String> {
        monitored
            .iter()
            .filter(|col| self.dest_for(col).is_some())
            .cloned()
            .collect()
    }

    /// Check that every mapped source column exists in the source headers
    /// and that at least one entry is routed.
    pub fn validate_source_headers(&self, headers: &[String]) -> MappingResult<()> {
        let missing: Vec<String> = self
            .source_columns()
            .into_iter()
            .filter(|col| !headers.iter().any(|h| h == col))
            .collect();

        if !missing.is_empty() {
            return Err(MappingError::MissingSourceColumns(missing));
        }
        if self.routed().next().is_none() {
            return Err(MappingError::NoRoutedColumns);
        }
        Ok(())
    }

    /// Check that every routed destination column exists in the
    /// destination headers.
    pub fn validate_dest_headers(&self, headers: &[String]) -> MappingResult<()> {
        let missing: Vec<String> = self
            .dest_columns()
            .into_iter()
            .filter(|col| !headers.iter().any(|h| h == col))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MappingError::MissingDestColumns(missing))
        }
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an example mapping for documentation and `example-mapping`
pub fn example_mapping() -> ColumnMapping {
    ColumnMapping {
        version: "1.0".to_string(),
        description: "Route store status exports into the follow-up sheet. \
                      Both status columns land in 'Notes'; internal columns are excluded."
            .to_string(),
        entries: vec![
            MappingEntry::route("Store", "Location"),
            MappingEntry::route("Date", "Date"),
            MappingEntry::route("Morning Status", "Notes"),
            MappingEntry::route("Evening Status", "Notes"),
            MappingEntry::exclude("Auditor"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_serialization_roundtrip() {
        let mapping = example_mapping();
        let json = mapping.to_json().unwrap();
        let parsed = ColumnMapping::from_json(&json).unwrap();
        assert_eq!(parsed, mapping);
    }

    #[test]
    fn test_exclude_serializes_as_null() {
        let mapping = ColumnMapping::new().with_entry(MappingEntry::exclude("Internal"));
        let json = mapping.to_json().unwrap();
        assert!(json.contains("\"dest\": null"));
    }

    #[test]
    fn test_routed_preserves_order() {
        let mapping = example_mapping();
        let routed: Vec<_> = mapping.routed().collect();
        assert_eq!(
            routed,
            vec![
                ("Store", "Location"),
                ("Date", "Date"),
                ("Morning Status", "Notes"),
                ("Evening Status", "Notes"),
            ]
        );
    }

    #[test]
    fn test_dest_columns_dedup() {
        let mapping = example_mapping();
        assert_eq!(mapping.dest_columns(), vec!["Location", "Date", "Notes"]);
    }

    #[test]
    fn test_active_monitored_requires_route() {
        let mapping = example_mapping();
        let monitored = vec![
            "Morning Status".to_string(),
            "Evening Status".to_string(),
            "Auditor".to_string(),
        ];
        // Auditor is excluded, so it is not actively monitored
        assert_eq!(
            mapping.active_monitored(&monitored),
            vec!["Morning Status", "Evening Status"]
        );
    }

    #[test]
    fn test_validate_source_headers() {
        let mapping = example_mapping();
        let headers: Vec<String> = ["Store", "Date", "Morning Status", "Evening Status", "Auditor"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(mapping.validate_source_headers(&headers).is_ok());

        let result = mapping.validate_source_headers(&["Store".to_string()]);
        assert!(matches!(result, Err(MappingError::MissingSourceColumns(_))));
    }

    #[test]
    fn test_validate_all_excluded() {
        let mapping = ColumnMapping::new().with_entry(MappingEntry::exclude("A"));
        let result = mapping.validate_source_headers(&["A".to_string()]);
        assert!(matches!(result, Err(MappingError::NoRoutedColumns)));
    }

    #[test]
    fn test_validate_dest_headers() {
        let mapping = example_mapping();
        let ok: Vec<String> = ["Location", "Date", "Notes", "Extra"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(mapping.validate_dest_headers(&ok).is_ok());

        let result = mapping.validate_dest_headers(&["Location".to_string()]);
        assert!(matches!(result, Err(MappingError::MissingDestColumns(_))));
    }
}
