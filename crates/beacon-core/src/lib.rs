//! Beacon Core — shared domain abstractions.
//!
//! This crate defines the storage records, repository traits, lifecycle
//! statuses and error type that every bounded context depends on. It contains
//! no infrastructure code.

pub mod audience;
pub mod clock;
pub mod error;
pub mod repository;
pub mod status;
