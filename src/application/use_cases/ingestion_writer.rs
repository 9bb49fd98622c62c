// ============================================================
// INGESTION WRITER
// ============================================================
// Best-effort sequential writes: a record that cannot be stored is
// logged and skipped, never aborting the batch. Composite columns
// (name, phone, address) are derived here, right before the insert.

use tracing::warn;
use uuid::Uuid;

use crate::application::use_cases::record_validator::parse_sale_date;
use crate::domain::error::Result;
use crate::domain::import::{ImportBatch, ImportKind, ImportResult, MappedRecord};
use crate::infrastructure::db::{CustomerInput, ImportStore, LeadInput, SaleInput};

pub struct IngestionWriter<'a> {
    store: &'a dyn ImportStore,
}

impl<'a> IngestionWriter<'a> {
    pub fn new(store: &'a dyn ImportStore) -> Self {
        Self { store }
    }

    /// Write a validated batch. Returns how many records made it in; the
    /// batch itself is recorded in import_batches for audit.
    pub async fn ingest(
        &self,
        kind: ImportKind,
        records: &[MappedRecord],
        file_name: Option<&str>,
    ) -> Result<ImportResult> {
        let mut imported = 0usize;

        for (row, record) in records.iter().enumerate() {
            match self.ingest_one(kind, record).await {
                Ok(true) => imported += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(row = row + 1, error = %e, "skipping record that failed to store");
                }
            }
        }

        let batch = ImportBatch {
            id: Uuid::new_v4().to_string(),
            kind: kind.as_str().to_string(),
            file_name: file_name.map(String::from),
            total_rows: records.len() as i64,
            imported_rows: imported as i64,
        };
        // The audit row must not turn a finished import into a failure
        if let Err(e) = self.store.record_batch(&batch).await {
            warn!(batch_id = %batch.id, error = %e, "failed to record import batch");
        }

        Ok(ImportResult::new(imported, records.len(), kind.as_str()))
    }

    /// Ok(true) = stored, Ok(false) = skipped for a known reason,
    /// Err = storage failure (caller logs and moves on).
    async fn ingest_one(&self, kind: ImportKind, record: &MappedRecord) -> Result<bool> {
        match kind {
            ImportKind::Customers => {
                let Some(name) = derive_name(record) else {
                    warn!("skipping customer record without a usable name");
                    return Ok(false);
                };
                let input = CustomerInput {
                    first_name: value(record, "firstName"),
                    last_name: value(record, "lastName"),
                    name,
                    email: value(record, "email"),
                    phone: derive_phone(record),
                    id_number: value(record, "idNumber"),
                    address: derive_address(record),
                    brand: value(record, "brand"),
                    notes: value(record, "notes"),
                };
                self.store.insert_customer(&input).await?;
                Ok(true)
            }
            ImportKind::Leads => {
                let Some(name) = derive_name(record) else {
                    warn!("skipping lead record without a usable name");
                    return Ok(false);
                };
                let input = LeadInput {
                    first_name: value(record, "firstName"),
                    last_name: value(record, "lastName"),
                    name,
                    email: value(record, "email"),
                    phone: derive_phone(record),
                    address: derive_address(record),
                    brand: value(record, "brand"),
                    status: value(record, "status").map(|s| s.to_lowercase()),
                    source: value(record, "source"),
                    notes: value(record, "notes"),
                };
                self.store.insert_lead(&input).await?;
                Ok(true)
            }
            ImportKind::Sales => {
                let Some(customer_id) = value(record, "customerId").and_then(|v| v.parse::<i64>().ok())
                else {
                    warn!("skipping sale record with unparseable customerId");
                    return Ok(false);
                };
                let Some(amount) = value(record, "amount").and_then(|v| v.parse::<f64>().ok())
                else {
                    warn!(customer_id, "skipping sale record with unparseable amount");
                    return Ok(false);
                };

                // Referential check before the insert so an unknown customer
                // skips this record instead of failing the statement
                if !self.store.customer_exists(customer_id).await? {
                    warn!(customer_id, "skipping sale for unknown customer");
                    return Ok(false);
                }

                let input = SaleInput {
                    customer_id,
                    amount,
                    sale_date: value(record, "date")
                        .and_then(|v| parse_sale_date(&v))
                        .map(|d| d.format("%Y-%m-%d").to_string()),
                    brand: value(record, "brand"),
                    notes: value(record, "notes"),
                };
                self.store.insert_sale(&input).await?;
                Ok(true)
            }
        }
    }
}

fn value(record: &MappedRecord, field: &str) -> Option<String> {
    record
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// firstName + lastName win over a raw full name.
fn derive_name(record: &MappedRecord) -> Option<String> {
    let first = value(record, "firstName");
    let last = value(record, "lastName");
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(only), None) | (None, Some(only)) => value(record, "name").or(Some(only)),
        (None, None) => value(record, "name"),
    }
}

/// phoneCountry and phoneNumber concatenate; either alone is kept as-is.
fn derive_phone(record: &MappedRecord) -> Option<String> {
    let country = value(record, "phoneCountry");
    let number = value(record, "phoneNumber");
    match (country, number) {
        (Some(country), Some(number)) => Some(format!("{}{}", country, number)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

/// address, city and province join with ", "; delivery instructions go on
/// their own line.
fn derive_address(record: &MappedRecord) -> Option<String> {
    let parts: Vec<String> = ["address", "city", "province"]
        .iter()
        .filter_map(|field| value(record, field))
        .collect();

    let mut address = parts.join(", ");
    if let Some(instructions) = value(record, "deliveryInstructions") {
        if address.is_empty() {
            address = instructions;
        } else {
            address.push('\n');
            address.push_str(&instructions);
        }
    }

    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}
