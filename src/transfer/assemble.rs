//! Destination row assembly.
//!
//! Projects an included source row through the column mapping. Monitored
//! columns contribute the matcher's extracted text, never the raw cell;
//! when two monitored sources route to the same destination column their
//! texts are concatenated in mapping order. All other routed columns copy
//! the raw cell value. Blank values are omitted entirely so the
//! destination cell stays untouched on write-back.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::mapping::ColumnMapping;

/// Separator used when two monitored columns land in one destination column.
const CONCAT_SEPARATOR: &str = ", ";

/// A destination row: destination column name to value, only for columns
/// that received a non-empty value.
pub type DestinationRow = Map<String, Value>;

/// Build the destination row for one included source row.
///
/// `active_monitored` is the monitored set narrowed to columns the mapping
/// actually routes; `extracted` is the matcher's per-column display text.
/// Assembly is pure: the same inputs always produce an identical row.
pub fn assemble(
    row: &Map<String, Value>,
    mapping: &ColumnMapping,
    active_monitored: &[String],
    extracted: &BTreeMap<String, String>,
) -> DestinationRow {
    let mut out = DestinationRow::new();

    for (source, dest) in mapping.routed() {
        if active_monitored.iter().any(|c| c == source) {
            let text = match extracted.get(source) {
                Some(t) if !t.is_empty() => t,
                _ => continue,
            };

            match out.get_mut(dest) {
                // Two monitored sources routed to the same destination:
                // concatenate in mapping order rather than overwrite.
                Some(Value::String(existing)) => {
                    existing.push_str(CONCAT_SEPARATOR);
                    existing.push_str(text);
                }
                _ => {
                    out.insert(dest.to_string(), Value::String(text.clone()));
                }
            }
        } else {
            let value = match row.get(source) {
                Some(v) if !is_blank(v) => v.clone(),
                _ => continue,
            };
            // Last writer wins on a shared destination; only the monitored
            // path merges.
            out.insert(dest.to_string(), value);
        }
    }

    out
}

/// Whether a cell value counts as blank (omitted from the destination row).
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
