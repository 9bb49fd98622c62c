// ============================================================
// IMPORT DOMAIN LAYER
// ============================================================
// Core types for the spreadsheet import pipeline
// No I/O, no async, no external dependencies beyond serde

mod kind;
mod record;

pub use kind::{CanonicalField, ImportKind, BRAND_TOKENS, LEAD_STATUSES};
pub use record::{FieldMapping, ImportBatch, ImportResult, MappedRecord, RawRecord, RawTable};
