//! Beacon — Smart-Assist providers.
//!
//! Text generation is a capability behind two traits: one turns a free-text
//! audience description into a segment definition, the other writes email
//! copy for a single recipient. Providers are chosen at startup and injected;
//! there is no process-wide registry.

pub mod mock_draft;
pub mod mock_segment;
pub mod provider;

pub use mock_draft::MockDraftAssistant;
pub use mock_segment::MockSegmentAssistant;
pub use provider::{
    AssistProvider, AssistProviders, DraftAssistant, DraftContext, EmailCopy, SegmentAssistant,
    UnknownProvider,
};
