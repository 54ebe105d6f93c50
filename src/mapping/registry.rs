//! Mapping template registry.
//!
//! Stores column mappings on disk so a mapping built once can be reused for
//! every export with the same column layout. Templates are matched to a
//! source table by column overlap.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::ColumnMapping;
use crate::error::{RegistryError, RegistryResult};

/// Directory where templates are stored (relative to current dir)
const DEFAULT_REGISTRY_DIR: &str = ".rowport/mappings";

/// A stored mapping with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMapping {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// The column mapping
    pub mapping: ColumnMapping,
    /// Source columns this mapping was created for
    pub source_columns: Vec<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last time this mapping was used
    pub last_used: Option<String>,
    /// Number of times used
    pub use_count: u32,
}

/// Registry for managing mapping templates
pub struct MappingRegistry {
    /// Directory where templates are stored
    registry_dir: PathBuf,
    /// Loaded templates (id -> template)
    templates: HashMap<String, StoredMapping>,
}

impl MappingRegistry {
    /// Create a new registry, loading existing templates from disk
    pub fn new() -> Self {
        Self::with_dir(DEFAULT_REGISTRY_DIR)
    }

    /// Create a registry with a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let registry_dir = PathBuf::from(dir.as_ref());
        let mut registry = Self {
            registry_dir,
            templates: HashMap::new(),
        };
        registry.load_all();
        registry
    }

    /// Load all templates from the registry directory
    fn load_all(&mut self) {
        if !self.registry_dir.exists() {
            return;
        }

        let entries = match fs::read_dir(&self.registry_dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(stored) = serde_json::from_str::<StoredMapping>(&content) {
                        self.templates.insert(stored.id.clone(), stored);
                    }
                }
            }
        }
    }

    /// Get all stored templates
    pub fn list(&self) -> Vec<&StoredMapping> {
        self.templates.values().collect()
    }

    /// Get a template by ID
    pub fn get(&self, id: &str) -> Option<&StoredMapping> {
        self.templates.get(id)
    }

    /// Find templates compatible with the given source columns.
    /// Returns templates sorted by compatibility score (descending).
    pub fn find_compatible(&self, source_columns: &[String]) -> Vec<(&StoredMapping, f64)> {
        let mut compatible: Vec<_> = self
            .templates
            .values()
            .filter_map(|t| {
                let score = compatibility_score(&t.source_columns, source_columns);
                if score > 0.5 {
                    Some((t, score))
                } else {
                    None
                }
            })
            .collect();

        compatible.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        compatible
    }

    /// Save a new mapping to the registry
    pub fn save(
        &mut self,
        mapping: ColumnMapping,
        name: &str,
        source_columns: Vec<String>,
    ) -> RegistryResult<String> {
        fs::create_dir_all(&self.registry_dir)?;

        let id = self.generate_id(name);
        let stored = StoredMapping {
            id: id.clone(),
            name: name.to_string(),
            mapping,
            source_columns,
            created_at: chrono::Utc::now().to_rfc3339(),
            last_used: None,
            use_count: 0,
        };

        let path = self.registry_dir.join(format!("{}.json", id));
        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&path, content)?;

        self.templates.insert(id.clone(), stored);
        Ok(id)
    }

    /// Import a mapping JSON file as a template
    pub fn import(&mut self, path: &Path, name: Option<&str>) -> RegistryResult<String> {
        let content = fs::read_to_string(path)?;

        let mapping: ColumnMapping = serde_json::from_str(&content)
            .map_err(|e| RegistryError::InvalidTemplate(e.to_string()))?;

        let mapping_name = name.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("imported")
        });

        let source_columns = mapping.source_columns();
        self.save(mapping, mapping_name, source_columns)
    }

    /// Record a use of a template
    pub fn touch(&mut self, id: &str) {
        if let Some(stored) = self.templates.get_mut(id) {
            stored.last_used = Some(chrono::Utc::now().to_rfc3339());
            stored.use_count += 1;

            let path = self.registry_dir.join(format!("{}.json", id));
            if let Ok(content) = serde_json::to_string_pretty(stored) {
                let _ = fs::write(&path, content);
            }
        }
    }

    /// Delete a template from the registry
    pub fn delete(&mut self, id: &str) -> RegistryResult<()> {
        if self.templates.remove(id).is_some() {
            let path = self.registry_dir.join(format!("{}.json", id));
            fs::remove_file(&path)?;
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.to_string()))
        }
    }

    /// Generate a unique ID from a name
    fn generate_id(&self, name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        let timestamp = chrono::Utc::now().timestamp_millis();
        format!("{}-{}", slug, timestamp)
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Share of a template's source columns present in the given headers
/// (case-insensitive).
fn compatibility_score(stored: &[String], headers: &[String]) -> f64 {
    if stored.is_empty() {
        return 0.0;
    }

    let headers_lower: Vec<String> = headers.iter().map(|c| c.to_lowercase()).collect();
    let match_count = stored
        .iter()
        .filter(|col| headers_lower.contains(&col.to_lowercase()))
        .count();

    match_count as f64 / stored.len() as f64
}
