//! Domain layer for the Segments context.

pub mod commands;
pub mod definition;
