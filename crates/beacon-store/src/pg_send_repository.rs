//! `PostgreSQL` implementation of the `SendRepository` trait.

use async_trait::async_trait;
use beacon_core::error::DomainError;
use beacon_core::repository::{SendRecord, SendRepository, SendUpsert};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{infrastructure, parse_status};

const SEND_COLUMNS: &str =
    "id, campaign_id, customer_id, draft_id, status, error, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct SendRow {
    id: Uuid,
    campaign_id: Uuid,
    customer_id: Uuid,
    draft_id: Uuid,
    status: String,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SendRow> for SendRecord {
    type Error = DomainError;

    fn try_from(row: SendRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            campaign_id: row.campaign_id,
            customer_id: row.customer_id,
            draft_id: row.draft_id,
            status: parse_status(&row.status)?,
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed send repository.
#[derive(Debug, Clone)]
pub struct PgSendRepository {
    pool: PgPool,
}

impl PgSendRepository {
    /// Creates a new `PgSendRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SendRepository for PgSendRepository {
    async fn upsert_send(
        &self,
        send: SendUpsert,
        now: DateTime<Utc>,
    ) -> Result<SendRecord, DomainError> {
        let row: SendRow = sqlx::query_as(&format!(
            r"
            INSERT INTO sends ({SEND_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT ON CONSTRAINT sends_campaign_customer_unique DO UPDATE
            SET draft_id = EXCLUDED.draft_id,
                status = EXCLUDED.status,
                error = EXCLUDED.error,
                updated_at = EXCLUDED.updated_at
            RETURNING {SEND_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(send.campaign_id)
        .bind(send.customer_id)
        .bind(send.draft_id)
        .bind(send.status.as_str())
        .bind(send.error.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.try_into()
    }

    async fn list_sends(&self, campaign_id: Uuid) -> Result<Vec<SendRecord>, DomainError> {
        let rows: Vec<SendRow> = sqlx::query_as(&format!(
            "SELECT {SEND_COLUMNS} FROM sends WHERE campaign_id = $1 ORDER BY created_at, id"
        ))
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
