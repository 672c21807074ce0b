//! Command handlers for the Campaigns context.

use std::collections::HashMap;

use beacon_assist::{DraftAssistant, DraftContext};
use beacon_core::clock::Clock;
use beacon_core::error::DomainError;
use beacon_core::repository::{
    CampaignRecord, CampaignRepository, DraftRepository, DraftUpsert, EmailDraftRecord,
    EventRecord, EventRepository, SegmentRepository, SendRecord, SendRepository, SendUpsert,
};
use beacon_core::status::{CampaignStatus, DraftStatus, SendStatus};
use beacon_segments::application::evaluator;
use beacon_segments::domain::definition::SegmentDefinition;
use chrono::Duration;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::{CreateCampaign, GenerateDrafts, ReviewDraft, SendCampaign};
use crate::domain::lifecycle;
use crate::domain::personalization::{
    PERSONALIZATION_WINDOW_DAYS, extract_recommended_sku, most_recent_event_type,
};

/// Result of a draft generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    /// Drafts created or refreshed.
    pub processed: usize,
}

/// Result of a send run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    /// Campaign status after the run.
    pub status: CampaignStatus,
    /// Sends recorded as delivered.
    pub sent: usize,
    /// Sends recorded as failed.
    pub failed: usize,
}

impl SendOutcome {
    fn tally(status: CampaignStatus, sends: &[SendRecord]) -> Self {
        let sent = sends.iter().filter(|s| s.status == SendStatus::Sent).count();
        let failed = sends.iter().filter(|s| s.status == SendStatus::Failed).count();
        Self {
            status,
            sent,
            failed,
        }
    }
}

async fn load_campaign(
    campaign_id: Uuid,
    campaigns: &dyn CampaignRepository,
) -> Result<CampaignRecord, DomainError> {
    campaigns
        .find_campaign(campaign_id)
        .await?
        .ok_or_else(|| DomainError::not_found("campaign", campaign_id))
}

/// Handles the `CreateCampaign` command. The segment's current definition
/// is copied onto the campaign and never re-read.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name,
/// `DomainError::NotFound` when the segment is absent, and
/// `DomainError::Infrastructure` if persistence fails.
pub async fn handle_create_campaign(
    command: &CreateCampaign,
    clock: &dyn Clock,
    segments: &dyn SegmentRepository,
    campaigns: &dyn CampaignRepository,
) -> Result<CampaignRecord, DomainError> {
    let name = command.name.trim();
    if name.is_empty() || name.contains('\0') {
        return Err(DomainError::Validation(
            "`name` must be a non-empty string".to_owned(),
        ));
    }
    let segment = segments
        .find_segment(command.segment_id)
        .await?
        .ok_or_else(|| DomainError::not_found("segment", command.segment_id))?;

    let campaign = campaigns
        .create_campaign(name, segment.id, &segment.definition, clock.now())
        .await?;

    info!(
        correlation_id = %command.correlation_id,
        campaign_id = %campaign.id,
        segment_id = %segment.id,
        "campaign created"
    );
    Ok(campaign)
}

/// Handles the `GenerateDrafts` command.
///
/// Membership is re-evaluated from the frozen snapshot on every run, and
/// every member gets a draft personalized from their last 30 days of
/// events. Re-running refreshes existing drafts in place. The campaign
/// moves to `drafted` once any draft exists; an empty audience leaves it
/// untouched.
///
/// # Errors
///
/// Returns `DomainError::NotFound` when the campaign is absent,
/// `DomainError::Conflict` once sending has started,
/// `DomainError::Validation` if the snapshot no longer parses (nothing is
/// written), and `DomainError::Infrastructure` if persistence fails.
pub async fn handle_generate_drafts(
    command: &GenerateDrafts,
    clock: &dyn Clock,
    campaigns: &dyn CampaignRepository,
    events: &dyn EventRepository,
    drafts: &dyn DraftRepository,
    assistant: &dyn DraftAssistant,
) -> Result<GenerationOutcome, DomainError> {
    let campaign = load_campaign(command.campaign_id, campaigns).await?;
    if !lifecycle::accepts_draft_generation(campaign.status) {
        return Err(DomainError::Conflict(format!(
            "cannot generate drafts for a campaign in status {}",
            campaign.status
        )));
    }
    let definition = SegmentDefinition::parse(&campaign.segment_snapshot)?;

    let audience = evaluator::evaluate_with_limit(&definition, clock, events, usize::MAX).await?;
    if audience.customers.is_empty() {
        info!(
            correlation_id = %command.correlation_id,
            campaign_id = %campaign.id,
            "segment matched no customers"
        );
        return Ok(GenerationOutcome { processed: 0 });
    }

    let now = clock.now();
    let customer_ids: Vec<Uuid> = audience.customers.iter().map(|c| c.id).collect();
    let since = now - Duration::days(PERSONALIZATION_WINDOW_DAYS);
    let mut history: HashMap<Uuid, Vec<EventRecord>> = HashMap::new();
    for event in events.recent_for_customers(&customer_ids, since).await? {
        history.entry(event.customer_id).or_default().push(event);
    }

    let mut processed = 0;
    for customer in &audience.customers {
        let recent = history.get(&customer.id).map_or(&[][..], Vec::as_slice);
        let context = DraftContext {
            email: customer.email.clone(),
            recent_event_type: most_recent_event_type(recent),
            recommended_sku: extract_recommended_sku(recent),
        };
        let copy = assistant.draft_email(&context).await?;
        drafts
            .upsert_draft(
                DraftUpsert {
                    campaign_id: campaign.id,
                    customer_id: customer.id,
                    subject: copy.subject,
                    body: copy.body,
                    recommended_sku: context.recommended_sku,
                    recent_event_type: context.recent_event_type,
                },
                now,
            )
            .await?;
        processed += 1;
    }

    if processed > 0 && campaign.status == CampaignStatus::Draft {
        campaigns
            .set_campaign_status(campaign.id, CampaignStatus::Drafted, now)
            .await?;
    }

    info!(
        correlation_id = %command.correlation_id,
        campaign_id = %campaign.id,
        processed,
        "drafts generated"
    );
    Ok(GenerationOutcome { processed })
}

/// Handles the `ReviewDraft` command. A draft can be reviewed exactly once;
/// the store applies the transition only if the draft is still `generated`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a status other than `approved` or
/// `rejected`, `DomainError::NotFound` when the draft is not part of the
/// campaign, `DomainError::Conflict` when it was already reviewed or the
/// campaign has started sending, and `DomainError::Infrastructure` if
/// persistence fails.
pub async fn handle_review_draft(
    command: &ReviewDraft,
    clock: &dyn Clock,
    campaigns: &dyn CampaignRepository,
    drafts: &dyn DraftRepository,
) -> Result<EmailDraftRecord, DomainError> {
    let target = lifecycle::review_target(&command.status)?;
    let draft = drafts
        .find_draft(command.campaign_id, command.draft_id)
        .await?
        .ok_or_else(|| DomainError::not_found("draft", command.draft_id))?;
    let campaign = load_campaign(command.campaign_id, campaigns).await?;
    if !lifecycle::accepts_review(campaign.status) {
        return Err(DomainError::Conflict(format!(
            "cannot review drafts of a campaign in status {}",
            campaign.status
        )));
    }
    lifecycle::ensure_reviewable(&draft)?;

    let reviewed = drafts
        .transition_draft_status(
            command.campaign_id,
            command.draft_id,
            DraftStatus::Generated,
            target,
            clock.now(),
        )
        .await?
        .ok_or_else(|| {
            DomainError::Conflict(format!("draft {} was reviewed concurrently", draft.id))
        })?;

    info!(
        correlation_id = %command.correlation_id,
        campaign_id = %command.campaign_id,
        draft_id = %reviewed.id,
        status = %reviewed.status,
        "draft reviewed"
    );
    Ok(reviewed)
}

/// Handles the `SendCampaign` command.
///
/// Queues one send per approved draft, delivers each, and settles the
/// campaign on `sent` (anything delivered) or `failed`. Sending an already `sent` campaign
/// writes nothing and reports the existing sends.
///
/// # Errors
///
/// Returns `DomainError::NotFound` when the campaign is absent,
/// `DomainError::Conflict` when the campaign is not ready to send or has
/// no approved drafts, and `DomainError::Infrastructure` if persistence
/// fails.
pub async fn handle_send_campaign(
    command: &SendCampaign,
    clock: &dyn Clock,
    campaigns: &dyn CampaignRepository,
    drafts: &dyn DraftRepository,
    sends: &dyn SendRepository,
) -> Result<SendOutcome, DomainError> {
    let campaign = load_campaign(command.campaign_id, campaigns).await?;
    if campaign.status == CampaignStatus::Sent {
        let existing = sends.list_sends(campaign.id).await?;
        info!(
            correlation_id = %command.correlation_id,
            campaign_id = %campaign.id,
            "campaign already sent"
        );
        return Ok(SendOutcome::tally(CampaignStatus::Sent, &existing));
    }
    if !lifecycle::accepts_send(campaign.status) {
        return Err(DomainError::Conflict(format!(
            "cannot send a campaign in status {}",
            campaign.status
        )));
    }

    let approved: Vec<EmailDraftRecord> = drafts
        .list_drafts(campaign.id)
        .await?
        .into_iter()
        .filter(|d| d.status == DraftStatus::Approved)
        .collect();
    if approved.is_empty() {
        return Err(DomainError::Conflict(
            "campaign has no approved drafts".to_owned(),
        ));
    }

    campaigns
        .set_campaign_status(campaign.id, CampaignStatus::Sending, clock.now())
        .await?;

    for draft in &approved {
        sends
            .upsert_send(
                SendUpsert {
                    campaign_id: campaign.id,
                    customer_id: draft.customer_id,
                    draft_id: draft.id,
                    status: SendStatus::Queued,
                    error: None,
                },
                clock.now(),
            )
            .await?;
    }

    let (mut sent, mut failed) = (0, 0);
    for draft in &approved {
        let delivery = lifecycle::simulate_delivery(draft);
        let status = lifecycle::send_status(&delivery);
        if let Err(reason) = &delivery {
            warn!(campaign_id = %campaign.id, draft_id = %draft.id, %reason, "delivery failed");
        }
        sends
            .upsert_send(
                SendUpsert {
                    campaign_id: campaign.id,
                    customer_id: draft.customer_id,
                    draft_id: draft.id,
                    status,
                    error: delivery.err(),
                },
                clock.now(),
            )
            .await?;
        match status {
            SendStatus::Sent => sent += 1,
            _ => failed += 1,
        }
    }

    let status = lifecycle::resolve_send_status(sent);
    campaigns
        .set_campaign_status(campaign.id, status, clock.now())
        .await?;

    info!(
        correlation_id = %command.correlation_id,
        campaign_id = %campaign.id,
        %status,
        sent,
        failed,
        "campaign send finished"
    );
    Ok(SendOutcome {
        status,
        sent,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use beacon_assist::{DraftAssistant, DraftContext, EmailCopy, MockDraftAssistant};
    use beacon_core::clock::Clock;
    use beacon_core::error::DomainError;
    use beacon_core::repository::{
        CampaignRecord, CampaignRepository, DraftRepository, SegmentRepository, SendRepository,
    };
    use beacon_core::status::{CampaignStatus, DraftStatus, SendStatus};
    use beacon_test_support::{FixedClock, InMemoryStore};
    use chrono::Duration;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    /// Forwards to the store and remembers every status written.
    struct RecordingSends<'a> {
        inner: &'a InMemoryStore,
        written: std::sync::Mutex<Vec<SendStatus>>,
    }

    #[async_trait::async_trait]
    impl SendRepository for RecordingSends<'_> {
        async fn upsert_send(
            &self,
            send: SendUpsert,
            now: chrono::DateTime<chrono::Utc>,
        ) -> Result<beacon_core::repository::SendRecord, DomainError> {
            self.written.lock().unwrap().push(send.status);
            self.inner.upsert_send(send, now).await
        }

        async fn list_sends(
            &self,
            campaign_id: Uuid,
        ) -> Result<Vec<beacon_core::repository::SendRecord>, DomainError> {
            self.inner.list_sends(campaign_id).await
        }
    }

    struct FailingDraftAssistant;

    #[async_trait::async_trait]
    impl DraftAssistant for FailingDraftAssistant {
        async fn draft_email(&self, _context: &DraftContext) -> Result<EmailCopy, DomainError> {
            Err(DomainError::Infrastructure("provider unavailable".to_owned()))
        }
    }

    async fn campaign_for(
        store: &InMemoryStore,
        clock: &FixedClock,
        definition: serde_json::Value,
    ) -> CampaignRecord {
        let segment = store
            .create_segment("Cart adders", &definition, clock.now())
            .await
            .unwrap();
        handle_create_campaign(
            &CreateCampaign {
                correlation_id: Uuid::new_v4(),
                name: "Win-back".to_owned(),
                segment_id: segment.id,
            },
            clock,
            store,
            store,
        )
        .await
        .unwrap()
    }

    fn cart_definition() -> serde_json::Value {
        json!({"kind": "event_type_in_last_days", "eventType": "add_to_cart", "days": 7})
    }

    async fn generate(store: &InMemoryStore, clock: &FixedClock, campaign_id: Uuid) -> usize {
        handle_generate_drafts(
            &GenerateDrafts {
                correlation_id: Uuid::new_v4(),
                campaign_id,
            },
            clock,
            store,
            store,
            store,
            &MockDraftAssistant,
        )
        .await
        .unwrap()
        .processed
    }

    async fn review(
        store: &InMemoryStore,
        clock: &FixedClock,
        campaign_id: Uuid,
        draft_id: Uuid,
        status: &str,
    ) -> Result<beacon_core::repository::EmailDraftRecord, DomainError> {
        handle_review_draft(
            &ReviewDraft {
                correlation_id: Uuid::new_v4(),
                campaign_id,
                draft_id,
                status: status.to_owned(),
            },
            clock,
            store,
            store,
        )
        .await
    }

    async fn send(
        store: &InMemoryStore,
        clock: &FixedClock,
        campaign_id: Uuid,
    ) -> Result<SendOutcome, DomainError> {
        handle_send_campaign(
            &SendCampaign {
                correlation_id: Uuid::new_v4(),
                campaign_id,
            },
            clock,
            store,
            store,
            store,
        )
        .await
    }

    #[tokio::test]
    async fn test_create_campaign_snapshots_segment_definition() {
        // Arrange
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        let campaign = campaign_for(&store, &clock, cart_definition()).await;

        // Act
        store
            .update_segment(
                campaign.segment_id,
                None,
                Some(&json!({"kind": "event_type_in_last_days", "eventType": "login", "days": 1})),
                clock.now(),
            )
            .await
            .unwrap();

        // Assert
        let stored = store.find_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Draft);
        assert_eq!(stored.segment_snapshot, cart_definition());
    }

    #[tokio::test]
    async fn test_create_campaign_for_missing_segment_is_not_found() {
        let store = InMemoryStore::new();

        let result = handle_create_campaign(
            &CreateCampaign {
                correlation_id: Uuid::new_v4(),
                name: "Orphan".to_owned(),
                segment_id: Uuid::new_v4(),
            },
            &FixedClock::reference(),
            &store,
            &store,
        )
        .await;

        assert!(matches!(result, Err(DomainError::NotFound { entity: "segment", .. })));
    }

    #[tokio::test]
    async fn test_generate_drafts_personalizes_each_member() {
        // Arrange
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        let now = clock.now();
        store.seed_event("jane@example.com", "page_view", json!({"sku": "WIDGET-42"}), now - Duration::hours(3));
        store.seed_event("jane@example.com", "add_to_cart", json!({"sku": ""}), now - Duration::hours(1));
        store.seed_event("li@example.com", "add_to_cart", json!({}), now - Duration::days(2));
        store.seed_event("old@example.com", "add_to_cart", json!({}), now - Duration::days(20));
        let campaign = campaign_for(&store, &clock, cart_definition()).await;

        // Act
        let processed = generate(&store, &clock, campaign.id).await;

        // Assert
        assert_eq!(processed, 2);
        let drafts = store.list_drafts(campaign.id).await.unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].customer_email, "jane@example.com");
        assert_eq!(drafts[0].recommended_sku.as_deref(), Some("WIDGET-42"));
        assert_eq!(drafts[0].recent_event_type.as_deref(), Some("add_to_cart"));
        assert_eq!(drafts[0].status, DraftStatus::Generated);
        assert_eq!(drafts[0].subject, "jane, still thinking about WIDGET-42?");
        assert_eq!(drafts[1].recommended_sku, None);
        let stored = store.find_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Drafted);
    }

    #[tokio::test]
    async fn test_regenerating_drafts_updates_in_place() {
        // Arrange
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        let now = clock.now();
        store.seed_event("jane@example.com", "add_to_cart", json!({"sku": "MUG-1"}), now - Duration::hours(5));
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        generate(&store, &clock, campaign.id).await;
        let first = store.list_drafts(campaign.id).await.unwrap();

        // Act
        store.seed_event("jane@example.com", "add_to_cart", json!({"sku": "WIDGET-42"}), now - Duration::hours(1));
        let processed = generate(&store, &clock, campaign.id).await;

        // Assert
        assert_eq!(processed, 1);
        let second = store.list_drafts(campaign.id).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(first[0].recommended_sku.as_deref(), Some("MUG-1"));
        assert_eq!(second[0].recommended_sku.as_deref(), Some("WIDGET-42"));
    }

    #[tokio::test]
    async fn test_empty_audience_leaves_campaign_in_draft() {
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        let campaign = campaign_for(&store, &clock, cart_definition()).await;

        let processed = generate(&store, &clock, campaign.id).await;

        assert_eq!(processed, 0);
        let stored = store.find_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Draft);
    }

    #[tokio::test]
    async fn test_invalid_snapshot_aborts_without_writing() {
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("jane@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = store
            .create_campaign("Broken", Uuid::new_v4(), &json!({"kind": "mystery"}), clock.now())
            .await
            .unwrap();

        let result = handle_generate_drafts(
            &GenerateDrafts {
                correlation_id: Uuid::new_v4(),
                campaign_id: campaign.id,
            },
            &clock,
            &store,
            &store,
            &store,
            &MockDraftAssistant,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(store.list_drafts(campaign.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_propagated() {
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("jane@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;

        let result = handle_generate_drafts(
            &GenerateDrafts {
                correlation_id: Uuid::new_v4(),
                campaign_id: campaign.id,
            },
            &clock,
            &store,
            &store,
            &store,
            &FailingDraftAssistant,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_generation_after_send_is_conflict() {
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        store
            .set_campaign_status(campaign.id, CampaignStatus::Sent, clock.now())
            .await
            .unwrap();

        let result = handle_generate_drafts(
            &GenerateDrafts {
                correlation_id: Uuid::new_v4(),
                campaign_id: campaign.id,
            },
            &clock,
            &store,
            &store,
            &store,
            &MockDraftAssistant,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_approving_twice_is_conflict() {
        // Arrange
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("jane@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        generate(&store, &clock, campaign.id).await;
        let draft_id = store.list_drafts(campaign.id).await.unwrap()[0].id;

        // Act
        let first = review(&store, &clock, campaign.id, draft_id, "approved").await;
        let second = review(&store, &clock, campaign.id, draft_id, "approved").await;

        // Assert
        assert_eq!(first.unwrap().status, DraftStatus::Approved);
        assert!(matches!(second, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_review_rejects_unknown_status_and_foreign_draft() {
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("jane@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        generate(&store, &clock, campaign.id).await;
        let draft_id = store.list_drafts(campaign.id).await.unwrap()[0].id;

        let invalid = review(&store, &clock, campaign.id, draft_id, "generated").await;
        let foreign = review(&store, &clock, Uuid::new_v4(), draft_id, "approved").await;

        assert!(matches!(invalid, Err(DomainError::Validation(_))));
        assert!(matches!(foreign, Err(DomainError::NotFound { entity: "draft", .. })));
    }

    #[tokio::test]
    async fn test_send_records_one_send_per_approved_draft() {
        // Arrange
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("amy@example.com", "add_to_cart", json!({}), clock.now());
        store.seed_event("bob@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        generate(&store, &clock, campaign.id).await;
        let drafts = store.list_drafts(campaign.id).await.unwrap();
        review(&store, &clock, campaign.id, drafts[0].id, "approved").await.unwrap();
        review(&store, &clock, campaign.id, drafts[1].id, "rejected").await.unwrap();

        // Act
        let outcome = send(&store, &clock, campaign.id).await.unwrap();

        // Assert
        assert_eq!(
            outcome,
            SendOutcome {
                status: CampaignStatus::Sent,
                sent: 1,
                failed: 0
            }
        );
        let sends = store.list_sends(campaign.id).await.unwrap();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].draft_id, drafts[0].id);
        assert_eq!(sends[0].status, SendStatus::Sent);
        let stored = store.find_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Sent);
    }

    #[tokio::test]
    async fn test_sends_are_queued_before_delivery() {
        // Arrange
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("amy@example.com", "add_to_cart", json!({}), clock.now());
        store.seed_event("bob@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        generate(&store, &clock, campaign.id).await;
        for draft in store.list_drafts(campaign.id).await.unwrap() {
            review(&store, &clock, campaign.id, draft.id, "approved").await.unwrap();
        }
        let recording = RecordingSends {
            inner: &store,
            written: std::sync::Mutex::new(Vec::new()),
        };

        // Act
        let outcome = handle_send_campaign(
            &SendCampaign {
                correlation_id: Uuid::new_v4(),
                campaign_id: campaign.id,
            },
            &clock,
            &store,
            &store,
            &recording,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(outcome.sent, 2);
        assert_eq!(
            *recording.written.lock().unwrap(),
            vec![SendStatus::Queued, SendStatus::Queued, SendStatus::Sent, SendStatus::Sent]
        );
        let sends = store.list_sends(campaign.id).await.unwrap();
        assert!(sends.iter().all(|s| s.status == SendStatus::Sent));
    }

    #[tokio::test]
    async fn test_resending_a_sent_campaign_is_a_no_op() {
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("amy@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        generate(&store, &clock, campaign.id).await;
        let draft_id = store.list_drafts(campaign.id).await.unwrap()[0].id;
        review(&store, &clock, campaign.id, draft_id, "approved").await.unwrap();
        let first = send(&store, &clock, campaign.id).await.unwrap();

        let second = send(&store, &clock, campaign.id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list_sends(campaign.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_review_after_send_is_conflict_and_sends_stay_unchanged() {
        // Arrange
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("amy@example.com", "add_to_cart", json!({}), clock.now());
        store.seed_event("bob@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;
        generate(&store, &clock, campaign.id).await;
        let drafts = store.list_drafts(campaign.id).await.unwrap();
        review(&store, &clock, campaign.id, drafts[0].id, "approved").await.unwrap();
        send(&store, &clock, campaign.id).await.unwrap();

        // Act
        let late = review(&store, &clock, campaign.id, drafts[1].id, "approved").await;
        let resend = send(&store, &clock, campaign.id).await.unwrap();

        // Assert
        assert!(matches!(late, Err(DomainError::Conflict(_))));
        let stored = store.find_draft(campaign.id, drafts[1].id).await.unwrap().unwrap();
        assert_eq!(stored.status, DraftStatus::Generated);
        assert_eq!(resend.sent, 1);
        assert_eq!(store.list_sends(campaign.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_without_approved_drafts_is_conflict() {
        let clock = FixedClock::reference();
        let store = InMemoryStore::new();
        store.seed_event("amy@example.com", "add_to_cart", json!({}), clock.now());
        let campaign = campaign_for(&store, &clock, cart_definition()).await;

        let before_drafts = send(&store, &clock, campaign.id).await;
        generate(&store, &clock, campaign.id).await;
        let unreviewed = send(&store, &clock, campaign.id).await;

        assert!(matches!(before_drafts, Err(DomainError::Conflict(_))));
        assert!(matches!(unreviewed, Err(DomainError::Conflict(_))));
        let stored = store.find_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Drafted);
    }
}
