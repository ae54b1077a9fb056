use std::sync::Arc;

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use tracing::warn;

use crate::domain::{institution_prefix, BankRecord, INSTITUTION_PREFIX_LEN};
use crate::error::StoreError;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:swift_codes.db";

/// BankStore owns all reads and writes against the banks table.
///
/// Handlers receive a clone of this store explicitly; there is no ambient
/// global handle.
#[derive(Clone)]
pub struct BankStore {
    pool: Arc<SqlitePool>,
}

impl BankStore {
    /// Create a new store against the given database URL
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database, honouring DATABASE_URL
    pub async fn init() -> Result<Self> {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema. Swift code uniqueness lives here,
    /// in the store itself.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS banks (
                swift_code TEXT PRIMARY KEY,
                bank_name TEXT NOT NULL,
                address TEXT NOT NULL,
                country_code TEXT NOT NULL,
                country_name TEXT NOT NULL,
                is_headquarter INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &*self.pool
    }

    /// Insert a record, upper-casing the code and country fields on the way
    /// in. Inserting a swift code that already exists is a silent no-op.
    pub async fn insert(&self, record: &BankRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO banks (swift_code, bank_name, address, country_code, country_name, is_headquarter)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (swift_code) DO NOTHING;
            "#,
        )
        .bind(record.swift_code.to_uppercase())
        .bind(&record.name)
        .bind(&record.address)
        .bind(record.country_code.to_uppercase())
        .bind(record.country_name.to_uppercase())
        .bind(record.is_headquarter)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Insert every record, tolerating per-record failures. A failed insert
    /// is logged and skipped; the rest of the batch is still attempted.
    /// Returns the number of records accepted by the store.
    pub async fn insert_all(&self, records: &[BankRecord]) -> usize {
        let mut stored = 0;
        for record in records {
            match self.insert(record).await {
                Ok(()) => stored += 1,
                Err(err) => {
                    warn!("Skipping record {}: {:?}", record.swift_code, err);
                }
            }
        }
        stored
    }

    /// Whether the store holds zero records; checked once at startup to gate
    /// bulk seeding.
    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM banks")
            .fetch_one(&*self.pool)
            .await?;
        let count: i64 = row.get("count");
        Ok(count == 0)
    }

    /// Look up a record by exact swift code. Codes are stored upper-cased, so
    /// callers must normalize the query code themselves.
    pub async fn get_by_code(&self, code: &str) -> Result<BankRecord, StoreError> {
        let row = sqlx::query(
            "SELECT swift_code, bank_name, address, country_code, country_name, is_headquarter
             FROM banks WHERE swift_code = ?",
        )
        .bind(code)
        .fetch_optional(&*self.pool)
        .await?;

        match row {
            Some(row) => Ok(record_from_row(&row)),
            None => Err(StoreError::NotFound),
        }
    }

    /// All records sharing the headquarters code's 8-character institution
    /// prefix, excluding the headquarters itself. Branch rows omit the
    /// country name.
    pub async fn branches_for(&self, hq_code: &str) -> Result<Vec<BankRecord>, StoreError> {
        let prefix = institution_prefix(hq_code)?;

        let rows = sqlx::query(
            "SELECT swift_code, bank_name, address, country_code, is_headquarter
             FROM banks WHERE substr(swift_code, 1, ?) = ? AND swift_code != ?",
        )
        .bind(INSTITUTION_PREFIX_LEN as i64)
        .bind(prefix)
        .bind(hq_code)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| BankRecord {
                address: row.get("address"),
                name: row.get("bank_name"),
                country_code: row.get("country_code"),
                country_name: String::new(),
                is_headquarter: row.get("is_headquarter"),
                swift_code: row.get("swift_code"),
            })
            .collect())
    }

    /// All records for a country code, ordered by swift code. The query code
    /// is compared as-is against the upper-cased stored value.
    pub async fn get_by_country(&self, country_code: &str) -> Result<Vec<BankRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT swift_code, bank_name, address, country_code, country_name, is_headquarter
             FROM banks WHERE country_code = ? ORDER BY swift_code",
        )
        .bind(country_code)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Delete a record by exact swift code; returns whether a row was removed
    pub async fn delete(&self, code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM banks WHERE swift_code = ?")
            .bind(code)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn record_from_row(row: &SqliteRow) -> BankRecord {
    BankRecord {
        address: row.get("address"),
        name: row.get("bank_name"),
        country_code: row.get("country_code"),
        country_name: row.get("country_name"),
        is_headquarter: row.get("is_headquarter"),
        swift_code: row.get("swift_code"),
    }
}
