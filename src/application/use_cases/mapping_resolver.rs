// ============================================================
// FIELD MAPPING RESOLVER
// ============================================================
// Propose default source→canonical mappings, enforce required-field
// coverage once the user confirms, and apply mappings row by row.

use crate::application::use_cases::header_normalizer::normalize_key;
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    FieldMapping, ImportKind, MappedRecord, RawRecord, BRAND_TOKENS,
};

/// Propose one mapping per source header: an exact case/punctuation-
/// insensitive match against the kind's canonical field names, or an empty
/// target ("do not import") when nothing matches. The sequence is what the
/// mapping UI edits; order follows the source columns.
pub fn propose_mappings(normalized_headers: &[String], kind: ImportKind) -> Vec<FieldMapping> {
    normalized_headers
        .iter()
        .map(|header| {
            let key = normalize_key(header);
            let target = kind
                .canonical_fields()
                .iter()
                .find(|f| normalize_key(f.name) == key)
                .map(|f| f.name)
                .unwrap_or("");
            FieldMapping::new(header.clone(), target)
        })
        .collect()
}

/// Verify every required canonical field appears as some mapping's target.
/// Fails with the full list of missing fields so the UI can name them all.
pub fn ensure_required_coverage(mappings: &[FieldMapping], kind: ImportKind) -> Result<()> {
    let missing: Vec<String> = kind
        .required_fields()
        .into_iter()
        .filter(|required| !mappings.iter().any(|m| m.target_field == *required))
        .map(String::from)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::MappingIncomplete(missing))
    }
}

/// Build a MappedRecord by copying each mapped source value to its target.
/// Absent source columns stay absent. The `brand` target gets the one
/// semantic transform at this layer: unrecognized tokens are dropped.
pub fn apply_mappings(mappings: &[FieldMapping], raw: &RawRecord) -> MappedRecord {
    let mut mapped = MappedRecord::new();

    for mapping in mappings.iter().filter(|m| !m.is_skipped()) {
        if let Some(value) = raw.get(&mapping.source_field) {
            let value = if mapping.target_field == "brand" {
                filter_brand_tokens(value)
            } else {
                value.clone()
            };
            mapped.insert(mapping.target_field.clone(), value);
        }
    }

    mapped
}

/// Apply one mapping sequence to every record.
pub fn apply_mappings_all(mappings: &[FieldMapping], records: &[RawRecord]) -> Vec<MappedRecord> {
    records
        .iter()
        .map(|raw| apply_mappings(mappings, raw))
        .collect()
}

/// Split a raw brand value on commas, trim/lower-case each token, keep only
/// recognized brands in their original relative order, and rejoin. Unknown
/// tokens are silently discarded, never an error.
pub fn filter_brand_tokens(value: &str) -> String {
    value
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| BRAND_TOKENS.contains(&token.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}
