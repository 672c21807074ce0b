//! Shared test doubles and utilities for the Beacon service.

mod clock;
mod failing;
mod memory;

pub use clock::FixedClock;
pub use failing::FailingStore;
pub use memory::InMemoryStore;
