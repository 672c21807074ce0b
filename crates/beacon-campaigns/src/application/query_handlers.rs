//! Query handlers for the Campaigns context.

use beacon_core::error::DomainError;
use beacon_core::repository::{
    CampaignRecord, CampaignRepository, DraftRepository, EmailDraftRecord, SendRecord,
    SendRepository,
};
use uuid::Uuid;

/// Retrieves a campaign by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the campaign does not exist.
pub async fn get_campaign_by_id(
    campaign_id: Uuid,
    campaigns: &dyn CampaignRepository,
) -> Result<CampaignRecord, DomainError> {
    campaigns
        .find_campaign(campaign_id)
        .await?
        .ok_or_else(|| DomainError::not_found("campaign", campaign_id))
}

/// Lists every campaign, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading fails.
pub async fn list_campaigns(
    campaigns: &dyn CampaignRepository,
) -> Result<Vec<CampaignRecord>, DomainError> {
    campaigns.list_campaigns().await
}

/// Lists a campaign's drafts ordered by recipient email.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the campaign does not exist.
pub async fn list_drafts(
    campaign_id: Uuid,
    campaigns: &dyn CampaignRepository,
    drafts: &dyn DraftRepository,
) -> Result<Vec<EmailDraftRecord>, DomainError> {
    get_campaign_by_id(campaign_id, campaigns).await?;
    drafts.list_drafts(campaign_id).await
}

/// Lists a campaign's sends.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the campaign does not exist.
pub async fn list_sends(
    campaign_id: Uuid,
    campaigns: &dyn CampaignRepository,
    sends: &dyn SendRepository,
) -> Result<Vec<SendRecord>, DomainError> {
    get_campaign_by_id(campaign_id, campaigns).await?;
    sends.list_sends(campaign_id).await
}
