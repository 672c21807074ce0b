//! Campaign and draft transition rules.

use beacon_core::error::DomainError;
use beacon_core::repository::EmailDraftRecord;
use beacon_core::status::{CampaignStatus, DraftStatus, SendStatus};

/// Whether drafts may be (re)generated in `status`.
#[must_use]
pub fn accepts_draft_generation(status: CampaignStatus) -> bool {
    matches!(status, CampaignStatus::Draft | CampaignStatus::Drafted)
}

/// Whether drafts of a campaign in `status` may still be reviewed. Once a
/// send has started the approved set is fixed.
#[must_use]
pub fn accepts_review(status: CampaignStatus) -> bool {
    accepts_draft_generation(status)
}

/// Whether a send may start (or resume) from `status`.
#[must_use]
pub fn accepts_send(status: CampaignStatus) -> bool {
    matches!(status, CampaignStatus::Drafted | CampaignStatus::Sending)
}

/// Parses a requested review status. Only `approved` and `rejected` are
/// accepted.
///
/// # Errors
///
/// Returns `DomainError::Validation` for any other value.
pub fn review_target(requested: &str) -> Result<DraftStatus, DomainError> {
    match requested.trim().parse::<DraftStatus>() {
        Ok(status @ (DraftStatus::Approved | DraftStatus::Rejected)) => Ok(status),
        _ => Err(DomainError::Validation(
            "`status` must be \"approved\" or \"rejected\"".to_owned(),
        )),
    }
}

/// Checks that `draft` can still be reviewed.
///
/// # Errors
///
/// Returns `DomainError::Conflict` once the draft has left `generated`.
pub fn ensure_reviewable(draft: &EmailDraftRecord) -> Result<(), DomainError> {
    if draft.status.is_terminal() {
        return Err(DomainError::Conflict(format!(
            "draft {} is already {}",
            draft.id, draft.status
        )));
    }
    Ok(())
}

/// Delivers one approved draft. Delivery is simulated and always succeeds;
/// an `Err` carries the failure reason recorded on the send.
#[allow(clippy::unnecessary_wraps)]
pub fn simulate_delivery(_draft: &EmailDraftRecord) -> Result<(), String> {
    Ok(())
}

/// Status recorded for one delivery attempt.
#[must_use]
pub fn send_status(result: &Result<(), String>) -> SendStatus {
    if result.is_ok() {
        SendStatus::Sent
    } else {
        SendStatus::Failed
    }
}

/// Final campaign status after a send run: `sent` when anything went out,
/// even alongside failures, otherwise `failed`.
#[must_use]
pub fn resolve_send_status(sent: usize) -> CampaignStatus {
    if sent > 0 {
        CampaignStatus::Sent
    } else {
        CampaignStatus::Failed
    }
}
