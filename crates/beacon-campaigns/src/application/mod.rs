//! Application layer for the Campaigns context.

pub mod command_handlers;
pub mod query_handlers;
