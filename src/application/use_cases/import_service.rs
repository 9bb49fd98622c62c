// ============================================================
// IMPORT SERVICE
// ============================================================
// Orchestrates the pipeline: parse → normalize headers → resolve
// mappings → validate → ingest. The HTTP layer only ever talks to
// this module.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::application::use_cases::header_normalizer::normalize_headers;
use crate::application::use_cases::ingestion_writer::IngestionWriter;
use crate::application::use_cases::mapping_resolver::{
    apply_mappings_all, ensure_required_coverage, propose_mappings,
};
use crate::application::use_cases::record_validator::validate_batch;
use crate::domain::error::Result;
use crate::domain::import::{
    FieldMapping, ImportKind, ImportResult, MappedRecord, RawRecord, RawTable,
};
use crate::infrastructure::db::ImportStore;

/// What the mapping UI needs to render after an upload: the normalized
/// headers, a proposed mapping per column, and a truncated preview of
/// the rows as they would import under that proposal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub headers: Vec<String>,
    pub mappings: Vec<FieldMapping>,
    pub records: Vec<MappedRecord>,
    pub total_rows: usize,
}

/// Rekey a parsed table from source headers to their normalized forms.
/// Index-aligned: the nth header's normalization renames the nth column.
pub fn normalize_table(table: RawTable) -> RawTable {
    let normalized = normalize_headers(&table.headers);

    let mut seen = HashSet::new();
    for header in &normalized {
        if !seen.insert(header.as_str()) {
            // Last column wins on collision; the earlier value is lost
            warn!(column = %header, "multiple source columns normalize to the same name");
        }
    }

    let records = table
        .records
        .into_iter()
        .map(|mut raw| {
            let mut renamed = RawRecord::new();
            for (original, normal) in table.headers.iter().zip(&normalized) {
                if let Some(value) = raw.remove(original) {
                    renamed.insert(normal.clone(), value);
                }
            }
            renamed
        })
        .collect();

    RawTable {
        headers: normalized,
        records,
    }
}

/// Build the preview for an uploaded table. Required-field coverage is NOT
/// enforced here; the user still gets to fix mappings in the UI.
pub fn preview(table: RawTable, kind: ImportKind, preview_rows: usize) -> Result<ImportPreview> {
    let total_rows = table.len();
    let table = normalize_table(table);
    let mappings = propose_mappings(&table.headers, kind);

    let records = apply_mappings_all(&mappings, &table.records)
        .into_iter()
        .take(preview_rows)
        .collect();

    Ok(ImportPreview {
        headers: table.headers,
        mappings,
        records,
        total_rows,
    })
}

/// Commit an uploaded table: mappings from the UI when provided, the
/// automatic proposal otherwise. Coverage and content validation both run
/// before any write.
pub async fn commit_table(
    store: &dyn ImportStore,
    table: RawTable,
    kind: ImportKind,
    mappings: Option<Vec<FieldMapping>>,
    file_name: Option<&str>,
) -> Result<ImportResult> {
    let table = normalize_table(table);
    let mappings = match mappings {
        Some(mappings) => mappings,
        None => propose_mappings(&table.headers, kind),
    };

    ensure_required_coverage(&mappings, kind)?;
    let records = apply_mappings_all(&mappings, &table.records);
    commit_mapped(store, records, kind, file_name).await
}

/// Commit rows that are already keyed by canonical field names (the JSON
/// body variant, where the client did the mapping itself).
pub async fn commit_mapped(
    store: &dyn ImportStore,
    records: Vec<MappedRecord>,
    kind: ImportKind,
    file_name: Option<&str>,
) -> Result<ImportResult> {
    validate_batch(&records, kind)?;

    let result = IngestionWriter::new(store)
        .ingest(kind, &records, file_name)
        .await?;

    info!(
        kind = %kind,
        imported = result.imported_count,
        total = result.total_count,
        "import committed"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::infrastructure::csv::CsvParser;
    use crate::infrastructure::db::SqliteImportStore;

    fn parse(content: &[u8]) -> RawTable {
        CsvParser::parse_bytes_auto_detect(content).unwrap()
    }

    #[test]
    fn test_preview_spanish_customers_csv() {
        let table = parse(b"Nombre;Apellido;Correo;Talla\nJuan;Perez;juan@x.com;M\nMaria;Lopez;maria@x.com;S\n");
        let preview = preview(table, ImportKind::Customers, 100).unwrap();

        assert_eq!(preview.headers, vec!["firstName", "lastName", "email", "talla"]);
        assert_eq!(preview.total_rows, 2);
        assert_eq!(preview.records.len(), 2);
        assert_eq!(preview.records[0]["firstName"], "Juan");
        // Unmapped column is proposed as "do not import"
        assert!(preview.mappings[3].is_skipped());
        assert!(!preview.records[0].contains_key("talla"));
    }

    #[test]
    fn test_colliding_normalized_headers_keep_the_last_value() {
        // "Nombre" and "First Name" both normalize to firstName
        let table = parse(b"Nombre;First Name;Apellido\nJuan;John;Perez\n");
        let normalized = normalize_table(table);

        assert_eq!(
            normalized.headers,
            vec!["firstName", "firstName", "lastName"]
        );
        assert_eq!(normalized.records[0]["firstName"], "John");
        assert_eq!(normalized.records[0]["lastName"], "Perez");
    }

    #[test]
    fn test_preview_truncates_but_reports_total() {
        let mut content = String::from("Nombre;Apellido\n");
        for i in 0..150 {
            content.push_str(&format!("N{};A{}\n", i, i));
        }
        let preview = preview(parse(content.as_bytes()), ImportKind::Customers, 100).unwrap();

        assert_eq!(preview.records.len(), 100);
        assert_eq!(preview.total_rows, 150);
    }

    #[tokio::test]
    async fn test_commit_table_end_to_end() {
        let store = SqliteImportStore::init("sqlite::memory:").await.unwrap();
        let table = parse(b"Nombre;Apellido;Marca\nJuan;Perez;Sleepwear\nMaria;Lopez;BRIDE\n");

        let result = commit_table(&store, table, ImportKind::Customers, None, Some("clientes.csv"))
            .await
            .unwrap();

        assert_eq!(result.imported_count, 2);
        assert_eq!(result.message, "Imported 2 of 2 customers");
    }

    #[tokio::test]
    async fn test_commit_rejects_uncovered_required_fields() {
        let store = SqliteImportStore::init("sqlite::memory:").await.unwrap();
        let table = parse(b"Correo\njuan@x.com\n");

        let err = commit_table(&store, table, ImportKind::Customers, None, None)
            .await
            .unwrap_err();
        match err {
            AppError::MappingIncomplete(missing) => {
                assert_eq!(missing, vec!["firstName", "lastName"])
            }
            other => panic!("expected MappingIncomplete, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_semicolon_only_row_fails_validation() {
        let store = SqliteImportStore::init("sqlite::memory:").await.unwrap();
        // The ";;" line parses as one record with empty values
        let table = parse(b"Nombre;Apellido;Correo\nJuan;Perez;juan@x.com\n;;\n");

        let err = commit_table(&store, table, ImportKind::Customers, None, None)
            .await
            .unwrap_err();
        match err {
            AppError::ValidationError(msg) => {
                assert!(msg.starts_with("1 record(s)"), "got: {}", msg)
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_mapped_json_variant() {
        let store = SqliteImportStore::init("sqlite::memory:").await.unwrap();
        let records = vec![[
            ("firstName".to_string(), "Juan".to_string()),
            ("lastName".to_string(), "Perez".to_string()),
        ]
        .into_iter()
        .collect()];

        let result = commit_mapped(&store, records, ImportKind::Customers, None)
            .await
            .unwrap();
        assert_eq!(result.imported_count, 1);
    }

    #[tokio::test]
    async fn test_sales_rerun_after_customer_deleted() {
        let store = SqliteImportStore::init("sqlite::memory:").await.unwrap();
        let customers = parse(b"Nombre;Apellido\nJuan;Perez\n");
        commit_table(&store, customers, ImportKind::Customers, None, None)
            .await
            .unwrap();

        let sales = parse(b"customerId;amount\n1;10\n");
        let first = commit_table(&store, sales.clone(), ImportKind::Sales, None, None)
            .await
            .unwrap();
        assert_eq!(first.imported_count, 1);

        sqlx::query("DELETE FROM customers WHERE id = 1")
            .execute(store.pool())
            .await
            .unwrap();

        // Same file again: the sale now references a missing customer and is
        // skipped, not an error
        let rerun = commit_table(&store, sales, ImportKind::Sales, None, None)
            .await
            .unwrap();
        assert_eq!(rerun.imported_count, 0);
        assert_eq!(rerun.total_count, 1);
    }

    #[tokio::test]
    async fn test_commit_sales_skips_unknown_customer() {
        let store = SqliteImportStore::init("sqlite::memory:").await.unwrap();
        let table = parse(b"customerId;amount\n999;10\n");

        let result = commit_table(&store, table, ImportKind::Sales, None, None)
            .await
            .unwrap();
        assert_eq!(result.imported_count, 0);
        assert_eq!(result.total_count, 1);
        assert_eq!(result.message, "Imported 0 of 1 sales");
    }
}
