//! Beacon — Segments bounded context.
//!
//! Responsible for validating rule-based audience definitions, storing named
//! segments and evaluating them against the event store.

pub mod application;
pub mod domain;
