//! A store whose every operation fails, for error-path tests.

use async_trait::async_trait;
use beacon_core::audience::{AudienceMatch, AudienceQuery};
use beacon_core::error::DomainError;
use beacon_core::repository::{
    CampaignRecord, CampaignRepository, CustomerRecord, CustomerRepository, DraftRepository,
    DraftUpsert, EmailDraftRecord, EventRecord, EventRepository, IngestedEvent, NewEvent,
    SegmentRecord, SegmentRepository, SendRecord, SendRepository, SendUpsert,
};
use beacon_core::status::{CampaignStatus, DraftStatus};
use chrono::{DateTime, Utc};
use uuid::Uuid;

fn refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

/// Implements every repository trait by returning an infrastructure error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

#[async_trait]
impl CustomerRepository for FailingStore {
    async fn upsert_by_email(
        &self,
        _email: &str,
        _now: DateTime<Utc>,
    ) -> Result<CustomerRecord, DomainError> {
        Err(refused())
    }

    async fn find_customer(&self, _id: Uuid) -> Result<Option<CustomerRecord>, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl EventRepository for FailingStore {
    async fn insert_event(&self, _event: NewEvent) -> Result<IngestedEvent, DomainError> {
        Err(refused())
    }

    async fn list_for_customer(
        &self,
        _customer_id: Uuid,
        _limit: usize,
    ) -> Result<Vec<EventRecord>, DomainError> {
        Err(refused())
    }

    async fn recent_for_customers(
        &self,
        _customer_ids: &[Uuid],
        _since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, DomainError> {
        Err(refused())
    }

    async fn match_audience(
        &self,
        _query: &AudienceQuery,
        _limit: usize,
    ) -> Result<AudienceMatch, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl SegmentRepository for FailingStore {
    async fn create_segment(
        &self,
        _name: &str,
        _definition: &serde_json::Value,
        _now: DateTime<Utc>,
    ) -> Result<SegmentRecord, DomainError> {
        Err(refused())
    }

    async fn find_segment(&self, _id: Uuid) -> Result<Option<SegmentRecord>, DomainError> {
        Err(refused())
    }

    async fn list_segments(&self) -> Result<Vec<SegmentRecord>, DomainError> {
        Err(refused())
    }

    async fn update_segment(
        &self,
        _id: Uuid,
        _name: Option<&str>,
        _definition: Option<&serde_json::Value>,
        _now: DateTime<Utc>,
    ) -> Result<Option<SegmentRecord>, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl CampaignRepository for FailingStore {
    async fn create_campaign(
        &self,
        _name: &str,
        _segment_id: Uuid,
        _segment_snapshot: &serde_json::Value,
        _now: DateTime<Utc>,
    ) -> Result<CampaignRecord, DomainError> {
        Err(refused())
    }

    async fn find_campaign(&self, _id: Uuid) -> Result<Option<CampaignRecord>, DomainError> {
        Err(refused())
    }

    async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>, DomainError> {
        Err(refused())
    }

    async fn set_campaign_status(
        &self,
        _id: Uuid,
        _status: CampaignStatus,
        _now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl DraftRepository for FailingStore {
    async fn upsert_draft(
        &self,
        _draft: DraftUpsert,
        _now: DateTime<Utc>,
    ) -> Result<EmailDraftRecord, DomainError> {
        Err(refused())
    }

    async fn list_drafts(&self, _campaign_id: Uuid) -> Result<Vec<EmailDraftRecord>, DomainError> {
        Err(refused())
    }

    async fn find_draft(
        &self,
        _campaign_id: Uuid,
        _draft_id: Uuid,
    ) -> Result<Option<EmailDraftRecord>, DomainError> {
        Err(refused())
    }

    async fn transition_draft_status(
        &self,
        _campaign_id: Uuid,
        _draft_id: Uuid,
        _from: DraftStatus,
        _to: DraftStatus,
        _now: DateTime<Utc>,
    ) -> Result<Option<EmailDraftRecord>, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl SendRepository for FailingStore {
    async fn upsert_send(
        &self,
        _send: SendUpsert,
        _now: DateTime<Utc>,
    ) -> Result<SendRecord, DomainError> {
        Err(refused())
    }

    async fn list_sends(&self, _campaign_id: Uuid) -> Result<Vec<SendRecord>, DomainError> {
        Err(refused())
    }
}
