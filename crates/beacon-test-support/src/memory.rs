//! In-memory implementation of every repository trait.
//!
//! Mirrors the PostgreSQL store's uniqueness rules and orderings closely
//! enough for application-layer tests: one customer per email, one event per
//! `(customer, idempotency key)`, one draft and one send per
//! `(campaign, customer)`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use beacon_core::audience::{
    AudienceMatch, AudiencePattern, AudienceQuery, CustomerRef, property_text,
};
use beacon_core::error::DomainError;
use beacon_core::repository::{
    CampaignRecord, CampaignRepository, CustomerRecord, CustomerRepository, DraftRepository,
    DraftUpsert, EmailDraftRecord, EventRecord, EventRepository, IngestedEvent, NewEvent,
    SegmentRecord, SegmentRepository, SendRecord, SendRepository, SendUpsert,
};
use beacon_core::status::{CampaignStatus, DraftStatus};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    customers: Vec<CustomerRecord>,
    events: Vec<EventRecord>,
    segments: Vec<SegmentRecord>,
    campaigns: Vec<CampaignRecord>,
    drafts: Vec<EmailDraftRecord>,
    sends: Vec<SendRecord>,
}

impl State {
    fn upsert_customer(&mut self, email: &str, now: DateTime<Utc>) -> CustomerRecord {
        if let Some(existing) = self.customers.iter_mut().find(|c| c.email == email) {
            existing.updated_at = now;
            return existing.clone();
        }
        let customer = CustomerRecord {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.customers.push(customer.clone());
        customer
    }

    fn customer_email(&self, customer_id: Uuid) -> Result<String, DomainError> {
        self.customers
            .iter()
            .find(|c| c.id == customer_id)
            .map(|c| c.email.clone())
            .ok_or_else(|| {
                DomainError::Infrastructure(format!("unknown customer {customer_id}"))
            })
    }
}

/// Thread-safe in-memory store for unit and route tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Stores an event for `email`, creating the customer when needed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_event(
        &self,
        email: &str,
        event_type: &str,
        properties: serde_json::Value,
        occurred_at: DateTime<Utc>,
    ) -> EventRecord {
        let mut state = self.state();
        let customer = state.upsert_customer(email, occurred_at);
        let event = EventRecord {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            event_type: event_type.to_owned(),
            properties,
            occurred_at,
            idempotency_key: None,
            created_at: occurred_at,
        };
        state.events.push(event.clone());
        event
    }

    /// Number of stored events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.state().events.len()
    }
}

fn newest_first(events: &mut [EventRecord]) {
    events.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn upsert_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<CustomerRecord, DomainError> {
        Ok(self.state().upsert_customer(email, now))
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<CustomerRecord>, DomainError> {
        Ok(self.state().customers.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn insert_event(&self, event: NewEvent) -> Result<IngestedEvent, DomainError> {
        let mut state = self.state();
        if let Some(key) = event.idempotency_key.as_deref() {
            let prior = state.events.iter().find(|e| {
                e.customer_id == event.customer_id && e.idempotency_key.as_deref() == Some(key)
            });
            if let Some(prior) = prior {
                return Ok(IngestedEvent {
                    created: false,
                    event: prior.clone(),
                });
            }
        }
        let record = EventRecord {
            id: Uuid::new_v4(),
            customer_id: event.customer_id,
            event_type: event.event_type,
            properties: event.properties,
            occurred_at: event.occurred_at,
            idempotency_key: event.idempotency_key,
            created_at: event.created_at,
        };
        state.events.push(record.clone());
        Ok(IngestedEvent {
            created: true,
            event: record,
        })
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<EventRecord>, DomainError> {
        let mut events: Vec<EventRecord> = self
            .state()
            .events
            .iter()
            .filter(|e| e.customer_id == customer_id)
            .cloned()
            .collect();
        newest_first(&mut events);
        events.truncate(limit);
        Ok(events)
    }

    async fn recent_for_customers(
        &self,
        customer_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, DomainError> {
        let mut events: Vec<EventRecord> = self
            .state()
            .events
            .iter()
            .filter(|e| customer_ids.contains(&e.customer_id) && e.occurred_at >= since)
            .cloned()
            .collect();
        newest_first(&mut events);
        Ok(events)
    }

    async fn match_audience(
        &self,
        query: &AudienceQuery,
        limit: usize,
    ) -> Result<AudienceMatch, DomainError> {
        let state = self.state();
        let mut counts: HashMap<Uuid, u32> = HashMap::new();
        for event in state
            .events
            .iter()
            .filter(|e| e.event_type == query.event_type && e.occurred_at >= query.since)
        {
            let qualifies = match &query.pattern {
                AudiencePattern::AnyEvent | AudiencePattern::MinCount(_) => true,
                AudiencePattern::PropertyEquals { path, value } => {
                    property_text(&event.properties, path).as_deref() == Some(value.as_str())
                }
            };
            if qualifies {
                *counts.entry(event.customer_id).or_default() += 1;
            }
        }
        let min_count = match query.pattern {
            AudiencePattern::MinCount(n) => n,
            _ => 1,
        };

        // Keyed by email so iteration is already in display order.
        let matched: BTreeMap<&str, Uuid> = state
            .customers
            .iter()
            .filter(|c| counts.get(&c.id).is_some_and(|n| *n >= min_count))
            .map(|c| (c.email.as_str(), c.id))
            .collect();

        Ok(AudienceMatch {
            count: i64::try_from(matched.len()).unwrap_or(i64::MAX),
            customers: matched
                .into_iter()
                .take(limit)
                .map(|(email, id)| CustomerRef {
                    id,
                    email: email.to_owned(),
                })
                .collect(),
        })
    }
}

#[async_trait]
impl SegmentRepository for InMemoryStore {
    async fn create_segment(
        &self,
        name: &str,
        definition: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<SegmentRecord, DomainError> {
        let segment = SegmentRecord {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            definition: definition.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state().segments.push(segment.clone());
        Ok(segment)
    }

    async fn find_segment(&self, id: Uuid) -> Result<Option<SegmentRecord>, DomainError> {
        Ok(self.state().segments.iter().find(|s| s.id == id).cloned())
    }

    async fn list_segments(&self) -> Result<Vec<SegmentRecord>, DomainError> {
        Ok(self.state().segments.iter().rev().cloned().collect())
    }

    async fn update_segment(
        &self,
        id: Uuid,
        name: Option<&str>,
        definition: Option<&serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<Option<SegmentRecord>, DomainError> {
        let mut state = self.state();
        let Some(segment) = state.segments.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            name.clone_into(&mut segment.name);
        }
        if let Some(definition) = definition {
            segment.definition = definition.clone();
        }
        segment.updated_at = now;
        Ok(Some(segment.clone()))
    }
}

#[async_trait]
impl CampaignRepository for InMemoryStore {
    async fn create_campaign(
        &self,
        name: &str,
        segment_id: Uuid,
        segment_snapshot: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<CampaignRecord, DomainError> {
        let campaign = CampaignRecord {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            segment_id,
            segment_snapshot: segment_snapshot.clone(),
            status: CampaignStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        self.state().campaigns.push(campaign.clone());
        Ok(campaign)
    }

    async fn find_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, DomainError> {
        Ok(self.state().campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>, DomainError> {
        Ok(self.state().campaigns.iter().rev().cloned().collect())
    }

    async fn set_campaign_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut state = self.state();
        let campaign = state
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("campaign", id))?;
        campaign.status = status;
        campaign.updated_at = now;
        Ok(())
    }
}

#[async_trait]
impl DraftRepository for InMemoryStore {
    async fn upsert_draft(
        &self,
        draft: DraftUpsert,
        now: DateTime<Utc>,
    ) -> Result<EmailDraftRecord, DomainError> {
        let mut state = self.state();
        let customer_email = state.customer_email(draft.customer_id)?;
        if let Some(existing) = state
            .drafts
            .iter_mut()
            .find(|d| d.campaign_id == draft.campaign_id && d.customer_id == draft.customer_id)
        {
            existing.subject = draft.subject;
            existing.body = draft.body;
            existing.recommended_sku = draft.recommended_sku;
            existing.recent_event_type = draft.recent_event_type;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let record = EmailDraftRecord {
            id: Uuid::new_v4(),
            campaign_id: draft.campaign_id,
            customer_id: draft.customer_id,
            customer_email,
            subject: draft.subject,
            body: draft.body,
            recommended_sku: draft.recommended_sku,
            recent_event_type: draft.recent_event_type,
            status: DraftStatus::Generated,
            created_at: now,
            updated_at: now,
        };
        state.drafts.push(record.clone());
        Ok(record)
    }

    async fn list_drafts(&self, campaign_id: Uuid) -> Result<Vec<EmailDraftRecord>, DomainError> {
        let mut drafts: Vec<EmailDraftRecord> = self
            .state()
            .drafts
            .iter()
            .filter(|d| d.campaign_id == campaign_id)
            .cloned()
            .collect();
        drafts.sort_by(|a, b| a.customer_email.cmp(&b.customer_email));
        Ok(drafts)
    }

    async fn find_draft(
        &self,
        campaign_id: Uuid,
        draft_id: Uuid,
    ) -> Result<Option<EmailDraftRecord>, DomainError> {
        Ok(self
            .state()
            .drafts
            .iter()
            .find(|d| d.campaign_id == campaign_id && d.id == draft_id)
            .cloned())
    }

    async fn transition_draft_status(
        &self,
        campaign_id: Uuid,
        draft_id: Uuid,
        from: DraftStatus,
        to: DraftStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<EmailDraftRecord>, DomainError> {
        let mut state = self.state();
        let Some(draft) = state
            .drafts
            .iter_mut()
            .find(|d| d.campaign_id == campaign_id && d.id == draft_id && d.status == from)
        else {
            return Ok(None);
        };
        draft.status = to;
        draft.updated_at = now;
        Ok(Some(draft.clone()))
    }
}

#[async_trait]
impl SendRepository for InMemoryStore {
    async fn upsert_send(
        &self,
        send: SendUpsert,
        now: DateTime<Utc>,
    ) -> Result<SendRecord, DomainError> {
        let mut state = self.state();
        if let Some(existing) = state
            .sends
            .iter_mut()
            .find(|s| s.campaign_id == send.campaign_id && s.customer_id == send.customer_id)
        {
            existing.draft_id = send.draft_id;
            existing.status = send.status;
            existing.error = send.error;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let record = SendRecord {
            id: Uuid::new_v4(),
            campaign_id: send.campaign_id,
            customer_id: send.customer_id,
            draft_id: send.draft_id,
            status: send.status,
            error: send.error,
            created_at: now,
            updated_at: now,
        };
        state.sends.push(record.clone());
        Ok(record)
    }

    async fn list_sends(&self, campaign_id: Uuid) -> Result<Vec<SendRecord>, DomainError> {
        Ok(self
            .state()
            .sends
            .iter()
            .filter(|s| s.campaign_id == campaign_id)
            .cloned()
            .collect())
    }
}
