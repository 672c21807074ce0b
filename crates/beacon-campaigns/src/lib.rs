//! Beacon — Campaigns bounded context.
//!
//! A campaign freezes a copy of its segment's definition, generates one
//! email draft per matching customer, lets each draft be approved or
//! rejected once, and simulates sending the approved ones.

pub mod application;
pub mod domain;
