//! Domain layer for the Tracking context.

pub mod commands;
pub mod validation;
