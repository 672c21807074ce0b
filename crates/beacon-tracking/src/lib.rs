//! Beacon — Tracking bounded context.
//!
//! Responsible for ingesting behavioral events, upserting the customer
//! profile each event belongs to, and deduplicating retried submissions by
//! idempotency key.

pub mod application;
pub mod domain;
