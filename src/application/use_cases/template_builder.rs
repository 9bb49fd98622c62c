// ============================================================
// TEMPLATE BUILDER
// ============================================================
// Downloadable semicolon-delimited CSV starter file per import kind:
// canonical headers plus two illustrative rows.

use csv::WriterBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::import::ImportKind;

/// Render the template for `kind` as CSV bytes.
pub fn build_template(kind: ImportKind) -> Result<Vec<u8>> {
    let headers: Vec<&str> = kind.canonical_fields().iter().map(|f| f.name).collect();

    let mut writer = WriterBuilder::new().delimiter(b';').from_writer(Vec::new());

    writer
        .write_record(&headers)
        .map_err(|e| AppError::Internal(format!("Failed to write template header: {}", e)))?;

    for row in 0..2 {
        let record: Vec<String> = headers
            .iter()
            .map(|field| sample_value(kind, field, row))
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::Internal(format!("Failed to write template row: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to finish template: {}", e)))
}

/// File name the template should download as.
pub fn template_file_name(kind: ImportKind) -> String {
    format!("{}_template.csv", kind.as_str())
}

fn sample_value(kind: ImportKind, field: &str, row: usize) -> String {
    let value = match field {
        "firstName" => ["Maria", "Juan"][row],
        "lastName" => ["Lopez", "Perez"][row],
        "name" => ["", ""][row],
        "email" => ["maria@example.com", "juan@example.com"][row],
        "phoneCountry" => ["+593", "+593"][row],
        "phoneNumber" => ["991234567", "987654321"][row],
        "idNumber" => ["1712345678", "0923456789"][row],
        "address" => ["Av. Amazonas 123", "Calle Larga 45"][row],
        "city" => ["Quito", "Cuenca"][row],
        "province" => ["Pichincha", "Azuay"][row],
        "deliveryInstructions" => ["Timbre azul", ""][row],
        "brand" => match kind {
            ImportKind::Sales => ["sleepwear", "bride"][row],
            _ => ["sleepwear", "sleepwear,bride"][row],
        },
        "status" => ["new", "contacted"][row],
        "source" => ["instagram", "referral"][row],
        "notes" => ["", ""][row],
        "customerId" => ["1", "2"][row],
        "amount" => ["49.90", "120.00"][row],
        "date" => ["2026-01-15", "2026-02-03"][row],
        _ => "",
    };
    value.to_string()
}
