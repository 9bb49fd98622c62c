// ============================================================
// IMPORT RECORD TYPES
// ============================================================
// Pre- and post-mapping representations of imported rows

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One parsed row keyed by source column header.
///
/// A header missing from a short row is absent from the map; a
/// present-but-empty cell is kept as an empty string. The distinction
/// ("column not provided" vs "empty value") is meaningful downstream.
pub type RawRecord = HashMap<String, String>;

/// One mapped row keyed by canonical field names only.
pub type MappedRecord = HashMap<String, String>;

/// Parser output: records plus the source header order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    /// Source column headers in file order.
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Correspondence from a source column to a canonical field.
/// An empty `target_field` means "do not import this column".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    pub target_field: String,
}

impl FieldMapping {
    pub fn new(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.into(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.target_field.is_empty()
    }
}

/// Terminal artifact of a successful ingestion. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported_count: usize,
    pub total_count: usize,
    pub message: String,
}

impl ImportResult {
    pub fn new(imported_count: usize, total_count: usize, kind: &str) -> Self {
        Self {
            imported_count,
            total_count,
            message: format!("Imported {} of {} {}", imported_count, total_count, kind),
        }
    }
}

/// Audit row recorded per commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub id: String,
    pub kind: String,
    pub file_name: Option<String>,
    pub total_rows: i64,
    pub imported_rows: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mapping_skip() {
        assert!(FieldMapping::new("extra", "").is_skipped());
        assert!(!FieldMapping::new("nombre", "firstName").is_skipped());
    }

    #[test]
    fn test_import_result_message() {
        let result = ImportResult::new(2, 3, "customers");
        assert_eq!(result.message, "Imported 2 of 3 customers");
        assert_eq!(result.imported_count, 2);
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn test_field_mapping_serde_camel_case() {
        let mapping = FieldMapping::new("nombre", "firstName");
        let json = serde_json::to_string(&mapping).unwrap();
        assert!(json.contains("sourceField"));
        assert!(json.contains("targetField"));
    }
}
