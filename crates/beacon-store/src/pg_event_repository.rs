//! `PostgreSQL` implementation of the `EventRepository` trait.
//!
//! Each audience pattern is a single statement: a CTE selects the distinct
//! matching customer ids, and `COUNT(*) OVER ()` carries the uncapped total
//! alongside the limited page.

use async_trait::async_trait;
use beacon_core::audience::{AudienceMatch, AudiencePattern, AudienceQuery, CustomerRef};
use beacon_core::error::DomainError;
use beacon_core::repository::{EventRecord, EventRepository, IngestedEvent, NewEvent};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{infrastructure, sql_limit};

const EVENT_COLUMNS: &str =
    "id, customer_id, event_type, properties, occurred_at, idempotency_key, created_at";

const MATCH_ANY_EVENT: &str = r"
WITH matched AS (
    SELECT DISTINCT customer_id
    FROM events
    WHERE event_type = $1 AND occurred_at >= $2
)
SELECT c.id, c.email, COUNT(*) OVER () AS total
FROM matched m
JOIN customers c ON c.id = m.customer_id
ORDER BY c.email ASC
LIMIT $3
";

const MATCH_PROPERTY_EQUALS: &str = r"
WITH matched AS (
    SELECT DISTINCT customer_id
    FROM events
    WHERE event_type = $1 AND occurred_at >= $2 AND properties #>> $3 = $4
)
SELECT c.id, c.email, COUNT(*) OVER () AS total
FROM matched m
JOIN customers c ON c.id = m.customer_id
ORDER BY c.email ASC
LIMIT $5
";

const MATCH_MIN_COUNT: &str = r"
WITH matched AS (
    SELECT customer_id
    FROM events
    WHERE event_type = $1 AND occurred_at >= $2
    GROUP BY customer_id
    HAVING COUNT(*) >= $3
)
SELECT c.id, c.email, COUNT(*) OVER () AS total
FROM matched m
JOIN customers c ON c.id = m.customer_id
ORDER BY c.email ASC
LIMIT $4
";

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    customer_id: Uuid,
    event_type: String,
    properties: serde_json::Value,
    occurred_at: DateTime<Utc>,
    idempotency_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for EventRecord {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            event_type: row.event_type,
            properties: row.properties,
            occurred_at: row.occurred_at,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AudienceRow {
    id: Uuid,
    email: String,
    total: i64,
}

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_idempotency_key(
        &self,
        customer_id: Uuid,
        key: &str,
    ) -> Result<EventRow, DomainError> {
        sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE customer_id = $1 AND idempotency_key = $2"
        ))
        .bind(customer_id)
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert_event(&self, event: NewEvent) -> Result<IngestedEvent, DomainError> {
        let inserted: Option<EventRow> = sqlx::query_as(&format!(
            r"
            INSERT INTO events ({EVENT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT ON CONSTRAINT events_customer_idempotency_key_unique DO NOTHING
            RETURNING {EVENT_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(event.customer_id)
        .bind(&event.event_type)
        .bind(&event.properties)
        .bind(event.occurred_at)
        .bind(event.idempotency_key.as_deref())
        .bind(event.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        if let Some(row) = inserted {
            return Ok(IngestedEvent {
                created: true,
                event: row.into(),
            });
        }

        // Only a keyed insert can hit the unique constraint.
        let key = event.idempotency_key.as_deref().ok_or_else(|| {
            DomainError::Infrastructure("event insert returned no row".to_owned())
        })?;
        debug!(customer_id = %event.customer_id, "duplicate idempotency key; returning prior event");
        let prior = self.find_by_idempotency_key(event.customer_id, key).await?;

        Ok(IngestedEvent {
            created: false,
            event: prior.into(),
        })
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<EventRecord>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            r"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE customer_id = $1
            ORDER BY occurred_at DESC, created_at DESC
            LIMIT $2
            "
        ))
        .bind(customer_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_for_customers(
        &self,
        customer_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, DomainError> {
        if customer_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            r"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE customer_id = ANY($1) AND occurred_at >= $2
            ORDER BY occurred_at DESC, created_at DESC
            "
        ))
        .bind(customer_ids)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn match_audience(
        &self,
        query: &AudienceQuery,
        limit: usize,
    ) -> Result<AudienceMatch, DomainError> {
        let statement = match &query.pattern {
            AudiencePattern::AnyEvent => sqlx::query_as::<_, AudienceRow>(MATCH_ANY_EVENT)
                .bind(&query.event_type)
                .bind(query.since),
            AudiencePattern::PropertyEquals { path, value } => {
                sqlx::query_as::<_, AudienceRow>(MATCH_PROPERTY_EQUALS)
                    .bind(&query.event_type)
                    .bind(query.since)
                    .bind(path)
                    .bind(value)
            }
            AudiencePattern::MinCount(min_count) => {
                sqlx::query_as::<_, AudienceRow>(MATCH_MIN_COUNT)
                    .bind(&query.event_type)
                    .bind(query.since)
                    .bind(i64::from(*min_count))
            }
        };

        let rows = statement
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;

        let count = rows.first().map_or(0, |row| row.total);
        debug!(event_type = %query.event_type, count, "audience matched");

        Ok(AudienceMatch {
            count,
            customers: rows
                .into_iter()
                .map(|row| CustomerRef {
                    id: row.id,
                    email: row.email,
                })
                .collect(),
        })
    }
}
