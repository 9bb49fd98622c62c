// ============================================================
// IMPORT KINDS & CANONICAL FIELDS
// ============================================================
// What can be imported and which fields each kind understands

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::{AppError, Result};

/// Category of entity being imported. Selected once per import session;
/// determines the canonical field set and validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Customers,
    Leads,
    Sales,
}

impl ImportKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "customers" => Ok(ImportKind::Customers),
            "leads" => Ok(ImportKind::Leads),
            "sales" => Ok(ImportKind::Sales),
            other => Err(AppError::ValidationError(format!(
                "Unknown import type: {} (expected customers, leads or sales)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Customers => "customers",
            ImportKind::Leads => "leads",
            ImportKind::Sales => "sales",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, possibly-required field understood by the ingestion layer
/// for a given [`ImportKind`].
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

const fn field(name: &'static str, required: bool, description: &'static str) -> CanonicalField {
    CanonicalField {
        name,
        required,
        description,
    }
}

const CUSTOMER_FIELDS: &[CanonicalField] = &[
    field("firstName", true, "First name"),
    field("lastName", true, "Last name"),
    field("name", false, "Full name (alternative to first/last)"),
    field("email", false, "Email address"),
    field("phoneCountry", false, "Phone country code, e.g. +593"),
    field("phoneNumber", false, "Phone number without country code"),
    field("idNumber", false, "National ID or passport"),
    field("address", false, "Street address"),
    field("city", false, "City"),
    field("province", false, "Province or state"),
    field("deliveryInstructions", false, "Delivery instructions"),
    field("brand", false, "Brands of interest: sleepwear, bride"),
    field("notes", false, "Free-form notes"),
];

const LEAD_FIELDS: &[CanonicalField] = &[
    field("firstName", true, "First name"),
    field("lastName", true, "Last name"),
    field("name", false, "Full name (alternative to first/last)"),
    field("email", false, "Email address"),
    field("phoneCountry", false, "Phone country code, e.g. +593"),
    field("phoneNumber", false, "Phone number without country code"),
    field("idNumber", false, "National ID or passport"),
    field("address", false, "Street address"),
    field("city", false, "City"),
    field("province", false, "Province or state"),
    field("deliveryInstructions", false, "Delivery instructions"),
    field("brand", false, "Brands of interest: sleepwear, bride"),
    field("status", false, "Pipeline stage"),
    field("source", false, "Where the lead came from"),
    field("notes", false, "Free-form notes"),
];

const SALE_FIELDS: &[CanonicalField] = &[
    field("customerId", true, "Numeric id of an existing customer"),
    field("amount", true, "Sale amount, must be > 0"),
    field("date", false, "Sale date (YYYY-MM-DD or DD/MM/YYYY)"),
    field("brand", false, "Brand sold: sleepwear or bride"),
    field("notes", false, "Free-form notes"),
];

/// Recognized brand tokens. Anything else is silently dropped during mapping.
pub const BRAND_TOKENS: &[&str] = &["sleepwear", "bride"];

/// Valid lead pipeline stages.
pub const LEAD_STATUSES: &[&str] = &[
    "new",
    "contacted",
    "qualified",
    "proposal",
    "negotiation",
    "won",
    "lost",
];

impl ImportKind {
    /// Canonical field set for this kind, in template/display order.
    pub fn canonical_fields(&self) -> &'static [CanonicalField] {
        match self {
            ImportKind::Customers => CUSTOMER_FIELDS,
            ImportKind::Leads => LEAD_FIELDS,
            ImportKind::Sales => SALE_FIELDS,
        }
    }

    /// Names of the required canonical fields for this kind.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.canonical_fields()
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }
}
