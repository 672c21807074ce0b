//! Deterministic `Clock` for tests.

use beacon_core::clock::Clock;
use chrono::{DateTime, TimeZone, Utc};

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// 2026-01-15T10:00:00Z, the instant shared by the workspace's tests.
    ///
    /// # Panics
    ///
    /// Never; the literal is a valid timestamp.
    #[must_use]
    pub fn reference() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
