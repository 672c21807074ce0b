//! Application layer for the Tracking context.

pub mod command_handlers;
pub mod query_handlers;
