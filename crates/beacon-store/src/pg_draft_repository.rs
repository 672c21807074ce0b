//! `PostgreSQL` implementation of the `DraftRepository` trait.
//!
//! Writes go through data-modifying CTEs so the returned row can be joined
//! with the recipient's email in one round trip.

use async_trait::async_trait;
use beacon_core::error::DomainError;
use beacon_core::repository::{DraftRepository, DraftUpsert, EmailDraftRecord};
use beacon_core::status::DraftStatus;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{infrastructure, parse_status};

const DRAFT_SELECT: &str = r"
SELECT d.id, d.campaign_id, d.customer_id, c.email AS customer_email, d.subject, d.body,
       d.recommended_sku, d.recent_event_type, d.status, d.created_at, d.updated_at
";

#[derive(Debug, sqlx::FromRow)]
struct DraftRow {
    id: Uuid,
    campaign_id: Uuid,
    customer_id: Uuid,
    customer_email: String,
    subject: String,
    body: String,
    recommended_sku: Option<String>,
    recent_event_type: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DraftRow> for EmailDraftRecord {
    type Error = DomainError;

    fn try_from(row: DraftRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            campaign_id: row.campaign_id,
            customer_id: row.customer_id,
            customer_email: row.customer_email,
            subject: row.subject,
            body: row.body,
            recommended_sku: row.recommended_sku,
            recent_event_type: row.recent_event_type,
            status: parse_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed email draft repository.
#[derive(Debug, Clone)]
pub struct PgDraftRepository {
    pool: PgPool,
}

impl PgDraftRepository {
    /// Creates a new `PgDraftRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftRepository for PgDraftRepository {
    async fn upsert_draft(
        &self,
        draft: DraftUpsert,
        now: DateTime<Utc>,
    ) -> Result<EmailDraftRecord, DomainError> {
        let row: DraftRow = sqlx::query_as(&format!(
            r"
            WITH d AS (
                INSERT INTO email_drafts (
                    id, campaign_id, customer_id, subject, body,
                    recommended_sku, recent_event_type, status, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                ON CONFLICT ON CONSTRAINT email_drafts_campaign_customer_unique DO UPDATE
                SET subject = EXCLUDED.subject,
                    body = EXCLUDED.body,
                    recommended_sku = EXCLUDED.recommended_sku,
                    recent_event_type = EXCLUDED.recent_event_type,
                    updated_at = EXCLUDED.updated_at
                RETURNING *
            )
            {DRAFT_SELECT}
            FROM d JOIN customers c ON c.id = d.customer_id
            "
        ))
        .bind(Uuid::new_v4())
        .bind(draft.campaign_id)
        .bind(draft.customer_id)
        .bind(&draft.subject)
        .bind(&draft.body)
        .bind(draft.recommended_sku.as_deref())
        .bind(draft.recent_event_type.as_deref())
        .bind(DraftStatus::Generated.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.try_into()
    }

    async fn list_drafts(&self, campaign_id: Uuid) -> Result<Vec<EmailDraftRecord>, DomainError> {
        let rows: Vec<DraftRow> = sqlx::query_as(&format!(
            r"
            {DRAFT_SELECT}
            FROM email_drafts d JOIN customers c ON c.id = d.customer_id
            WHERE d.campaign_id = $1
            ORDER BY c.email ASC
            "
        ))
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_draft(
        &self,
        campaign_id: Uuid,
        draft_id: Uuid,
    ) -> Result<Option<EmailDraftRecord>, DomainError> {
        let row: Option<DraftRow> = sqlx::query_as(&format!(
            r"
            {DRAFT_SELECT}
            FROM email_drafts d JOIN customers c ON c.id = d.customer_id
            WHERE d.campaign_id = $1 AND d.id = $2
            "
        ))
        .bind(campaign_id)
        .bind(draft_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn transition_draft_status(
        &self,
        campaign_id: Uuid,
        draft_id: Uuid,
        from: DraftStatus,
        to: DraftStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<EmailDraftRecord>, DomainError> {
        let row: Option<DraftRow> = sqlx::query_as(&format!(
            r"
            WITH d AS (
                UPDATE email_drafts
                SET status = $4, updated_at = $5
                WHERE campaign_id = $1 AND id = $2 AND status = $3
                RETURNING *
            )
            {DRAFT_SELECT}
            FROM d JOIN customers c ON c.id = d.customer_id
            "
        ))
        .bind(campaign_id)
        .bind(draft_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.map(TryInto::try_into).transpose()
    }
}
