//! Shared application state.

use std::fmt;
use std::sync::Arc;

use beacon_assist::AssistProviders;
use beacon_core::clock::Clock;
use beacon_core::repository::{
    CampaignRepository, CustomerRepository, DraftRepository, EventRepository, SegmentRepository,
    SendRepository,
};
use beacon_store::pg_campaign_repository::PgCampaignRepository;
use beacon_store::pg_customer_repository::PgCustomerRepository;
use beacon_store::pg_draft_repository::PgDraftRepository;
use beacon_store::pg_event_repository::PgEventRepository;
use beacon_store::pg_segment_repository::PgSegmentRepository;
use beacon_store::pg_send_repository::PgSendRepository;
use sqlx::PgPool;

/// One handle per repository trait.
#[derive(Clone)]
pub struct Repositories {
    /// Customer profiles.
    pub customers: Arc<dyn CustomerRepository>,
    /// Events and audience queries.
    pub events: Arc<dyn EventRepository>,
    /// Segments.
    pub segments: Arc<dyn SegmentRepository>,
    /// Campaigns.
    pub campaigns: Arc<dyn CampaignRepository>,
    /// Email drafts.
    pub drafts: Arc<dyn DraftRepository>,
    /// Sends.
    pub sends: Arc<dyn SendRepository>,
}

impl Repositories {
    /// PostgreSQL repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            customers: Arc::new(PgCustomerRepository::new(pool.clone())),
            events: Arc::new(PgEventRepository::new(pool.clone())),
            segments: Arc::new(PgSegmentRepository::new(pool.clone())),
            campaigns: Arc::new(PgCampaignRepository::new(pool.clone())),
            drafts: Arc::new(PgDraftRepository::new(pool.clone())),
            sends: Arc::new(PgSendRepository::new(pool.clone())),
        }
    }

    /// Every trait served by one store.
    #[must_use]
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: CustomerRepository
            + EventRepository
            + SegmentRepository
            + CampaignRepository
            + DraftRepository
            + SendRepository
            + 'static,
    {
        Self {
            customers: store.clone(),
            events: store.clone(),
            segments: store.clone(),
            campaigns: store.clone(),
            drafts: store.clone(),
            sends: store,
        }
    }
}

impl fmt::Debug for Repositories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Clock for deterministic time.
    pub clock: Arc<dyn Clock>,
    /// Storage.
    pub repositories: Repositories,
    /// Smart-Assist providers.
    pub assist: AssistProviders,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("db_pool", &self.db_pool)
            .field("repositories", &self.repositories)
            .field("assist", &self.assist)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        db_pool: PgPool,
        clock: Arc<dyn Clock>,
        repositories: Repositories,
        assist: AssistProviders,
    ) -> Self {
        Self {
            db_pool,
            clock,
            repositories,
            assist,
        }
    }
}
