//! Segment evaluation against the event store.

use beacon_core::audience::{AUDIENCE_PREVIEW_LIMIT, AudienceMatch};
use beacon_core::clock::Clock;
use beacon_core::error::DomainError;
use beacon_core::repository::EventRepository;
use tracing::debug;

use crate::domain::definition::SegmentDefinition;

/// Evaluates a definition for display: the uncapped member count plus the
/// first 50 members by email.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the audience query fails.
pub async fn evaluate(
    definition: &SegmentDefinition,
    clock: &dyn Clock,
    events: &dyn EventRepository,
) -> Result<AudienceMatch, DomainError> {
    evaluate_with_limit(definition, clock, events, AUDIENCE_PREVIEW_LIMIT).await
}

/// Evaluates a definition returning at most `limit` members.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the audience query fails.
pub async fn evaluate_with_limit(
    definition: &SegmentDefinition,
    clock: &dyn Clock,
    events: &dyn EventRepository,
    limit: usize,
) -> Result<AudienceMatch, DomainError> {
    let query = definition.to_audience_query(clock.now());
    let audience = events.match_audience(&query, limit).await?;
    debug!(
        event_type = %query.event_type,
        since = %query.since,
        count = audience.count,
        "segment evaluated"
    );
    Ok(audience)
}

#[cfg(test)]
mod tests {
    use beacon_core::clock::Clock;
    use beacon_core::error::DomainError;
    use beacon_test_support::{FailingStore, FixedClock, InMemoryStore};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::{evaluate, evaluate_with_limit};
    use crate::domain::definition::SegmentDefinition;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_type_in_last_days_excludes_out_of_window_and_wrong_type() {
        // Arrange
        let clock = clock();
        let now = clock.now();
        let store = InMemoryStore::new();
        store.seed_event("recent@example.com", "purchase", json!({}), now - Duration::days(2));
        store.seed_event("stale@example.com", "purchase", json!({}), now - Duration::days(8));
        store.seed_event("other@example.com", "login", json!({}), now - Duration::days(1));
        let definition = SegmentDefinition::EventTypeInLastDays {
            event_type: "purchase".to_owned(),
            days: 7,
        };

        // Act
        let audience = evaluate(&definition, &clock, &store).await.unwrap();

        // Assert
        assert_eq!(audience.count, 1);
        let emails: Vec<_> = audience.customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["recent@example.com"]);
    }

    #[tokio::test]
    async fn test_count_gte_matches_three_events_but_not_two() {
        let clock = clock();
        let now = clock.now();
        let store = InMemoryStore::new();
        for day in [1, 4, 9] {
            store.seed_event("busy@example.com", "page_view", json!({}), now - Duration::days(day));
        }
        for day in [2, 5] {
            store.seed_event("quiet@example.com", "page_view", json!({}), now - Duration::days(day));
        }
        let definition = SegmentDefinition::parse(&json!({
            "kind": "event_count_gte_in_last_days",
            "eventType": "page_view",
            "days": 30,
            "minCount": 3
        }))
        .unwrap();

        let audience = evaluate(&definition, &clock, &store).await.unwrap();

        assert_eq!(audience.count, 1);
        assert_eq!(audience.customers[0].email, "busy@example.com");
    }

    #[tokio::test]
    async fn test_property_equals_compares_exact_string() {
        let clock = clock();
        let now = clock.now();
        let store = InMemoryStore::new();
        store.seed_event("a@example.com", "page_view", json!({"path": "/pricing"}), now - Duration::days(1));
        store.seed_event("b@example.com", "page_view", json!({"path": "/pricing/"}), now - Duration::days(1));
        store.seed_event("c@example.com", "page_view", json!({"path": "/pricing"}), now - Duration::days(40));
        let definition = SegmentDefinition::EventPropertyEquals {
            event_type: "page_view".to_owned(),
            path: "path".to_owned(),
            value: "/pricing".to_owned(),
            days: 30,
        };

        let audience = evaluate(&definition, &clock, &store).await.unwrap();

        assert_eq!(audience.count, 1);
        assert_eq!(audience.customers[0].email, "a@example.com");
    }

    #[tokio::test]
    async fn test_count_is_uncapped_while_customers_are_capped() {
        let clock = clock();
        let now = clock.now();
        let store = InMemoryStore::new();
        for i in 0..55 {
            store.seed_event(&format!("user{i:02}@example.com"), "login", json!({}), now);
        }
        let definition = SegmentDefinition::EventTypeInLastDays {
            event_type: "login".to_owned(),
            days: 1,
        };

        let preview = evaluate(&definition, &clock, &store).await.unwrap();
        let everyone = evaluate_with_limit(&definition, &clock, &store, usize::MAX).await.unwrap();

        assert_eq!(preview.count, 55);
        assert_eq!(preview.customers.len(), 50);
        assert_eq!(preview.customers[0].email, "user00@example.com");
        assert_eq!(preview.customers[49].email, "user49@example.com");
        assert_eq!(everyone.customers.len(), 55);
    }

    #[tokio::test]
    async fn test_evaluate_propagates_infrastructure_errors() {
        let definition = SegmentDefinition::EventTypeInLastDays {
            event_type: "login".to_owned(),
            days: 1,
        };

        let result = evaluate(&definition, &clock(), &FailingStore).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
