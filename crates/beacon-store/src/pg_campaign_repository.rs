//! `PostgreSQL` implementation of the `CampaignRepository` trait.

use async_trait::async_trait;
use beacon_core::error::DomainError;
use beacon_core::repository::{CampaignRecord, CampaignRepository};
use beacon_core::status::CampaignStatus;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{infrastructure, parse_status};

const CAMPAIGN_COLUMNS: &str = "id, name, segment_id, segment_snapshot, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: Uuid,
    name: String,
    segment_id: Uuid,
    segment_snapshot: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for CampaignRecord {
    type Error = DomainError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            segment_id: row.segment_id,
            segment_snapshot: row.segment_snapshot,
            status: parse_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed campaign repository.
#[derive(Debug, Clone)]
pub struct PgCampaignRepository {
    pool: PgPool,
}

impl PgCampaignRepository {
    /// Creates a new `PgCampaignRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn create_campaign(
        &self,
        name: &str,
        segment_id: Uuid,
        segment_snapshot: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<CampaignRecord, DomainError> {
        let row: CampaignRow = sqlx::query_as(&format!(
            r"
            INSERT INTO campaigns (id, name, segment_id, segment_snapshot, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {CAMPAIGN_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(segment_id)
        .bind(segment_snapshot)
        .bind(CampaignStatus::Draft.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.try_into()
    }

    async fn find_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, DomainError> {
        let row: Option<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>, DomainError> {
        let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn set_campaign_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE campaigns SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("campaign", id));
        }
        Ok(())
    }
}
