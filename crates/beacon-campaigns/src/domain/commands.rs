//! Commands for the Campaigns context.

use uuid::Uuid;

/// Command to create a campaign from a segment.
#[derive(Debug, Clone)]
pub struct CreateCampaign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name.
    pub name: String,
    /// Segment whose definition is snapshotted.
    pub segment_id: Uuid,
}

/// Command to (re)generate drafts for every current segment member.
#[derive(Debug, Clone)]
pub struct GenerateDrafts {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target campaign.
    pub campaign_id: Uuid,
}

/// Command to approve or reject one draft.
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Owning campaign.
    pub campaign_id: Uuid,
    /// The draft under review.
    pub draft_id: Uuid,
    /// Requested status as sent by the client.
    pub status: String,
}

/// Command to simulate sending every approved draft.
#[derive(Debug, Clone)]
pub struct SendCampaign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target campaign.
    pub campaign_id: Uuid,
}
