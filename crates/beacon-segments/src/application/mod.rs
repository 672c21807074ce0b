//! Application layer for the Segments context.

pub mod command_handlers;
pub mod evaluator;
pub mod query_handlers;
