// ============================================================
// RECORD VALIDATOR
// ============================================================
// Batch-blocking content rules per import kind. Rules run in a fixed
// order; the first rule with any offenders fails the whole batch,
// reporting how many records broke it.

use chrono::NaiveDate;

use crate::domain::error::{AppError, Result};
use crate::domain::import::{ImportKind, MappedRecord, LEAD_STATUSES};

/// Brand values accepted for customers and leads (multi-brand allowed).
const MULTI_BRAND_VALUES: &[&str] = &["sleepwear", "bride", "sleepwear,bride", "bride,sleepwear"];

/// Brand values accepted for sales (single brand only).
const SINGLE_BRAND_VALUES: &[&str] = &["sleepwear", "bride"];

/// Validate a full batch before ingestion. Zero input records is its own
/// error, distinct from "some records invalid".
pub fn validate_batch(records: &[MappedRecord], kind: ImportKind) -> Result<()> {
    if records.is_empty() {
        return Err(AppError::ValidationError(
            "No data found in file".to_string(),
        ));
    }

    match kind {
        ImportKind::Customers | ImportKind::Leads => {
            check_rule(records, has_identity, "are missing firstName/lastName or name")?;
            check_rule(
                records,
                |r| brand_ok(r, MULTI_BRAND_VALUES),
                "have an invalid brand",
            )?;
            check_rule(records, phone_country_ok, "have a phoneCountry not starting with '+'")?;
            if kind == ImportKind::Leads {
                check_rule(records, lead_status_ok, "have an invalid lead status")?;
            }
        }
        ImportKind::Sales => {
            check_rule(
                records,
                |r| brand_ok(r, SINGLE_BRAND_VALUES),
                "have an invalid brand",
            )?;
            check_rule(
                records,
                sale_fields_ok,
                "have an invalid customerId, amount or date",
            )?;
        }
    }

    Ok(())
}

fn check_rule(
    records: &[MappedRecord],
    rule: impl Fn(&MappedRecord) -> bool,
    reason: &str,
) -> Result<()> {
    let offenders = records.iter().filter(|r| !rule(r)).count();
    if offenders > 0 {
        return Err(AppError::ValidationError(format!(
            "{} record(s) {}",
            offenders, reason
        )));
    }
    Ok(())
}

/// Non-empty value for `field`, treating a present-but-empty cell as absent.
fn value_of<'a>(record: &'a MappedRecord, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn has_identity(record: &MappedRecord) -> bool {
    let has_split_name =
        value_of(record, "firstName").is_some() && value_of(record, "lastName").is_some();
    has_split_name || value_of(record, "name").is_some()
}

fn brand_ok(record: &MappedRecord, allowed: &[&str]) -> bool {
    match value_of(record, "brand") {
        None => true,
        Some(brand) => allowed.contains(&brand.to_lowercase().as_str()),
    }
}

fn phone_country_ok(record: &MappedRecord) -> bool {
    match value_of(record, "phoneCountry") {
        None => true,
        Some(code) => code.starts_with('+'),
    }
}

fn lead_status_ok(record: &MappedRecord) -> bool {
    match value_of(record, "status") {
        None => true,
        Some(status) => LEAD_STATUSES.contains(&status.to_lowercase().as_str()),
    }
}

fn sale_fields_ok(record: &MappedRecord) -> bool {
    let customer_ok = value_of(record, "customerId")
        .and_then(|v| v.parse::<i64>().ok())
        .map(|id| id > 0)
        .unwrap_or(false);

    let amount_ok = value_of(record, "amount")
        .and_then(|v| v.parse::<f64>().ok())
        .map(|amount| amount > 0.0)
        .unwrap_or(false);

    let date_ok = match value_of(record, "date") {
        None => true,
        Some(date) => parse_sale_date(date).is_some(),
    };

    customer_ok && amount_ok && date_ok
}

/// Sale dates show up in ISO and Latin American day-first forms.
pub fn parse_sale_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}
