//! `PostgreSQL` implementation of the `CustomerRepository` trait.

use async_trait::async_trait;
use beacon_core::error::DomainError;
use beacon_core::repository::{CustomerRecord, CustomerRepository};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::infrastructure;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerRecord {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed customer repository.
#[derive(Debug, Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Creates a new `PgCustomerRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn upsert_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<CustomerRecord, DomainError> {
        let row: CustomerRow = sqlx::query_as(
            r"
            INSERT INTO customers (id, email, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (email) DO UPDATE SET updated_at = EXCLUDED.updated_at
            RETURNING id, email, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.into())
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<CustomerRecord>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT id, email, created_at, updated_at FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(Into::into))
    }
}
