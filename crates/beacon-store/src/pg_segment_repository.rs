//! `PostgreSQL` implementation of the `SegmentRepository` trait.

use async_trait::async_trait;
use beacon_core::error::DomainError;
use beacon_core::repository::{SegmentRecord, SegmentRepository};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::infrastructure;

#[derive(Debug, sqlx::FromRow)]
struct SegmentRow {
    id: Uuid,
    name: String,
    definition: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SegmentRow> for SegmentRecord {
    fn from(row: SegmentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            definition: row.definition,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed segment repository.
#[derive(Debug, Clone)]
pub struct PgSegmentRepository {
    pool: PgPool,
}

impl PgSegmentRepository {
    /// Creates a new `PgSegmentRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SegmentRepository for PgSegmentRepository {
    async fn create_segment(
        &self,
        name: &str,
        definition: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<SegmentRecord, DomainError> {
        let row: SegmentRow = sqlx::query_as(
            r"
            INSERT INTO segments (id, name, definition, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, name, definition, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(definition)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.into())
    }

    async fn find_segment(&self, id: Uuid) -> Result<Option<SegmentRecord>, DomainError> {
        let row: Option<SegmentRow> = sqlx::query_as(
            "SELECT id, name, definition, created_at, updated_at FROM segments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(Into::into))
    }

    async fn list_segments(&self) -> Result<Vec<SegmentRecord>, DomainError> {
        let rows: Vec<SegmentRow> = sqlx::query_as(
            r"
            SELECT id, name, definition, created_at, updated_at
            FROM segments
            ORDER BY created_at DESC, id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_segment(
        &self,
        id: Uuid,
        name: Option<&str>,
        definition: Option<&serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<Option<SegmentRecord>, DomainError> {
        let row: Option<SegmentRow> = sqlx::query_as(
            r"
            UPDATE segments
            SET name = COALESCE($2, name),
                definition = COALESCE($3, definition),
                updated_at = $4
            WHERE id = $1
            RETURNING id, name, definition, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(definition.cloned())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(Into::into))
    }
}
