use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool},
    Pool, Sqlite,
};

use super::{CustomerInput, ImportStore, LeadInput, SaleInput};
use crate::domain::error::{AppError, Result};
use crate::domain::import::ImportBatch;

pub struct SqliteImportStore {
    pool: Pool<Sqlite>,
}

impl SqliteImportStore {
    pub async fn init(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
            })?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<()> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT,
                last_name TEXT,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                id_number TEXT,
                address TEXT,
                brand TEXT,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            "CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT,
                last_name TEXT,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                address TEXT,
                brand TEXT,
                status TEXT,
                source TEXT,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            "CREATE TABLE IF NOT EXISTS sales (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                sale_date TEXT,
                brand TEXT,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            "CREATE TABLE IF NOT EXISTS import_batches (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                file_name TEXT,
                total_rows INTEGER NOT NULL,
                imported_rows INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to create table: {}", e)))?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl ImportStore for SqliteImportStore {
    async fn insert_customer(&self, customer: &CustomerInput) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO customers (first_name, last_name, name, email, phone, id_number, address, brand, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.id_number)
        .bind(&customer.address)
        .bind(&customer.brand)
        .bind(&customer.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert customer: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_lead(&self, lead: &LeadInput) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO leads (first_name, last_name, name, email, phone, address, brand, status, source, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.address)
        .bind(&lead.brand)
        .bind(&lead.status)
        .bind(&lead.source)
        .bind(&lead.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert lead: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_sale(&self, sale: &SaleInput) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO sales (customer_id, amount, sale_date, brand, notes)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(sale.customer_id)
        .bind(sale.amount)
        .bind(&sale.sale_date)
        .bind(&sale.brand)
        .bind(&sale.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert sale: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    async fn customer_exists(&self, customer_id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM customers WHERE id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to look up customer: {}", e)))?;

        Ok(row.is_some())
    }

    async fn record_batch(&self, batch: &ImportBatch) -> Result<()> {
        sqlx::query(
            "INSERT INTO import_batches (id, kind, file_name, total_rows, imported_rows)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&batch.id)
        .bind(&batch.kind)
        .bind(&batch.file_name)
        .bind(batch.total_rows)
        .bind(batch.imported_rows)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to record batch: {}", e)))?;

        Ok(())
    }
}
