//! Storage records and repository abstractions.
//!
//! Every uniqueness guarantee the service relies on (one customer per email,
//! one event per idempotency key, one draft and one send per campaign and
//! customer) is enforced by the implementation of these traits, not by
//! callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audience::{AudienceMatch, AudienceQuery};
use crate::error::DomainError;
use crate::status::{CampaignStatus, DraftStatus, SendStatus};

/// Stored customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    /// Customer identifier.
    pub id: Uuid,
    /// Normalized (trimmed, lowercase) email. Unique.
    pub email: String,
    /// First time the customer was seen.
    pub created_at: DateTime<Utc>,
    /// Last time an event was ingested for the customer.
    pub updated_at: DateTime<Utc>,
}

/// Stored behavioral event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event identifier.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Free-text event type, e.g. `page_view`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// JSON property bag (always an object).
    pub properties: serde_json::Value,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
    /// Client-supplied deduplication token.
    pub idempotency_key: Option<String>,
    /// When the event was stored.
    pub created_at: DateTime<Utc>,
}

/// An event to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Owning customer.
    pub customer_id: Uuid,
    /// Event type (already trimmed).
    pub event_type: String,
    /// JSON property bag.
    pub properties: serde_json::Value,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
    /// Deduplication token, unique per customer.
    pub idempotency_key: Option<String>,
    /// Storage timestamp.
    pub created_at: DateTime<Utc>,
}

/// Outcome of an idempotent event insert.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedEvent {
    /// `false` when an event with the same idempotency key already existed.
    pub created: bool,
    /// The stored event (new or prior).
    pub event: EventRecord,
}

/// Stored segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    /// Segment identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Canonical rule definition JSON.
    pub definition: serde_json::Value,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Stored campaign.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Campaign identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Segment the campaign was created from.
    pub segment_id: Uuid,
    /// Copy of the segment definition taken at creation time.
    pub segment_snapshot: serde_json::Value,
    /// Lifecycle status.
    pub status: CampaignStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Stored email draft, joined with the recipient's email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraftRecord {
    /// Draft identifier.
    pub id: Uuid,
    /// Owning campaign.
    pub campaign_id: Uuid,
    /// Recipient.
    pub customer_id: Uuid,
    /// Recipient email.
    pub customer_email: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// SKU the copy was built around, if any.
    pub recommended_sku: Option<String>,
    /// Type of the recipient's most recent event, if any.
    pub recent_event_type: Option<String>,
    /// Review status.
    pub status: DraftStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last regeneration or review time.
    pub updated_at: DateTime<Utc>,
}

/// Generated content for a draft keyed by `(campaign_id, customer_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftUpsert {
    /// Owning campaign.
    pub campaign_id: Uuid,
    /// Recipient.
    pub customer_id: Uuid,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// SKU the copy was built around.
    pub recommended_sku: Option<String>,
    /// Recipient's most recent event type.
    pub recent_event_type: Option<String>,
}

/// Stored send record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    /// Send identifier.
    pub id: Uuid,
    /// Owning campaign.
    pub campaign_id: Uuid,
    /// Recipient.
    pub customer_id: Uuid,
    /// Draft that was sent.
    pub draft_id: Uuid,
    /// Delivery status.
    pub status: SendStatus,
    /// Failure reason when `status` is `Failed`.
    pub error: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Send outcome keyed by `(campaign_id, customer_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendUpsert {
    /// Owning campaign.
    pub campaign_id: Uuid,
    /// Recipient.
    pub customer_id: Uuid,
    /// Draft being sent.
    pub draft_id: Uuid,
    /// Delivery status.
    pub status: SendStatus,
    /// Failure reason.
    pub error: Option<String>,
}

/// Customer profile persistence.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Returns the customer with `email`, creating it when absent. `email`
    /// must already be normalized.
    async fn upsert_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<CustomerRecord, DomainError>;

    /// Loads a customer by id.
    async fn find_customer(&self, id: Uuid) -> Result<Option<CustomerRecord>, DomainError>;
}

/// Event persistence and audience queries.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Stores an event. When `idempotency_key` is set and an event with the
    /// same key already exists for the customer, nothing is written and the
    /// prior event is returned with `created: false`.
    async fn insert_event(&self, event: NewEvent) -> Result<IngestedEvent, DomainError>;

    /// Latest `limit` events of one customer, newest first.
    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<EventRecord>, DomainError>;

    /// All events of the given customers with `occurred_at >= since`, newest first.
    async fn recent_for_customers(
        &self,
        customer_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, DomainError>;

    /// Counts distinct matching customers and returns up to `limit` of them
    /// ordered by email ascending.
    async fn match_audience(
        &self,
        query: &AudienceQuery,
        limit: usize,
    ) -> Result<AudienceMatch, DomainError>;
}

/// Segment persistence.
#[async_trait]
pub trait SegmentRepository: Send + Sync {
    /// Stores a new segment.
    async fn create_segment(
        &self,
        name: &str,
        definition: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<SegmentRecord, DomainError>;

    /// Loads a segment by id.
    async fn find_segment(&self, id: Uuid) -> Result<Option<SegmentRecord>, DomainError>;

    /// All segments, newest first.
    async fn list_segments(&self) -> Result<Vec<SegmentRecord>, DomainError>;

    /// Replaces the provided fields. Returns `None` when the segment is absent.
    async fn update_segment(
        &self,
        id: Uuid,
        name: Option<&str>,
        definition: Option<&serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<Option<SegmentRecord>, DomainError>;
}

/// Campaign persistence.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Stores a new campaign in `Draft` status.
    async fn create_campaign(
        &self,
        name: &str,
        segment_id: Uuid,
        segment_snapshot: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<CampaignRecord, DomainError>;

    /// Loads a campaign by id.
    async fn find_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, DomainError>;

    /// All campaigns, newest first.
    async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>, DomainError>;

    /// Overwrites the campaign status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the campaign is absent.
    async fn set_campaign_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}

/// Email draft persistence.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Inserts or refreshes the draft for `(campaign_id, customer_id)`. An
    /// existing draft keeps its id and review status.
    async fn upsert_draft(
        &self,
        draft: DraftUpsert,
        now: DateTime<Utc>,
    ) -> Result<EmailDraftRecord, DomainError>;

    /// Drafts of a campaign ordered by recipient email.
    async fn list_drafts(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<EmailDraftRecord>, DomainError>;

    /// Loads one draft of a campaign.
    async fn find_draft(
        &self,
        campaign_id: Uuid,
        draft_id: Uuid,
    ) -> Result<Option<EmailDraftRecord>, DomainError>;

    /// Moves a draft from `from` to `to` atomically. Returns `None` when the
    /// draft is absent or no longer in `from`.
    async fn transition_draft_status(
        &self,
        campaign_id: Uuid,
        draft_id: Uuid,
        from: DraftStatus,
        to: DraftStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<EmailDraftRecord>, DomainError>;
}

/// Send persistence.
#[async_trait]
pub trait SendRepository: Send + Sync {
    /// Inserts or updates the send for `(campaign_id, customer_id)`.
    async fn upsert_send(
        &self,
        send: SendUpsert,
        now: DateTime<Utc>,
    ) -> Result<SendRecord, DomainError>;

    /// Sends of a campaign ordered by creation time.
    async fn list_sends(&self, campaign_id: Uuid) -> Result<Vec<SendRecord>, DomainError>;
}
