// ============================================================
// DATABASE INFRASTRUCTURE
// ============================================================
// SQLite persistence behind the ImportStore trait so the ingestion
// writer stays testable without a real pool.

mod sqlite;

pub use sqlite::SqliteImportStore;

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::import::ImportBatch;

/// Insert payload for a customer row, composite fields already derived.
#[derive(Debug, Clone, Default)]
pub struct CustomerInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub address: Option<String>,
    pub brand: Option<String>,
    pub notes: Option<String>,
}

/// Insert payload for a lead row. Same shape as a customer plus the
/// pipeline fields.
#[derive(Debug, Clone, Default)]
pub struct LeadInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub brand: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

/// Insert payload for a sale row. `customer_id` is checked against the
/// customers table before the insert is attempted.
#[derive(Debug, Clone, Default)]
pub struct SaleInput {
    pub customer_id: i64,
    pub amount: f64,
    pub sale_date: Option<String>,
    pub brand: Option<String>,
    pub notes: Option<String>,
}

/// Persistence seam for the ingestion writer.
#[async_trait]
pub trait ImportStore: Send + Sync {
    async fn insert_customer(&self, customer: &CustomerInput) -> Result<i64>;
    async fn insert_lead(&self, lead: &LeadInput) -> Result<i64>;
    async fn insert_sale(&self, sale: &SaleInput) -> Result<i64>;
    async fn customer_exists(&self, customer_id: i64) -> Result<bool>;
    async fn record_batch(&self, batch: &ImportBatch) -> Result<()>;
}
