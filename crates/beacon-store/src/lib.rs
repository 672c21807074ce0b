//! Beacon Store — PostgreSQL implementations of the repository traits.
//!
//! Queries are bound at runtime; the schema lives in the workspace
//! `migrations/` directory and is embedded here as [`MIGRATOR`].

use beacon_core::error::DomainError;
use sqlx::migrate::Migrator;

pub mod pg_campaign_repository;
pub mod pg_customer_repository;
pub mod pg_draft_repository;
pub mod pg_event_repository;
pub mod pg_segment_repository;
pub mod pg_send_repository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Maps a driver error onto the domain's infrastructure variant.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn infrastructure(err: sqlx::Error) -> DomainError {
    tracing::debug!(error = %err, "database error");
    DomainError::Infrastructure(err.to_string())
}

/// Converts a caller-supplied row limit into a SQL `LIMIT` value.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Parses a persisted status column.
pub(crate) fn parse_status<T>(value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = beacon_core::status::UnknownStatus>,
{
    value
        .parse::<T>()
        .map_err(|e| DomainError::Infrastructure(e.to_string()))
}
