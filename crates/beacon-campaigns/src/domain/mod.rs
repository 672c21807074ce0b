//! Domain layer for the Campaigns context.

pub mod commands;
pub mod lifecycle;
pub mod personalization;
