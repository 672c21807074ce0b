//! Template-driven email copy.

use async_trait::async_trait;
use beacon_core::error::DomainError;

use crate::provider::{DraftAssistant, DraftContext, EmailCopy};

fn first_name(email: &str) -> &str {
    let local = email.split('@').next().unwrap_or_default().trim();
    if local.is_empty() { "there" } else { local }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Deterministic draft writer with one template per combination of
/// "has a recommended SKU" and "has a recent event".
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDraftAssistant;

impl MockDraftAssistant {
    /// Renders the copy without going through the async trait.
    #[must_use]
    pub fn compose(&self, context: &DraftContext) -> EmailCopy {
        let name = first_name(&context.email);
        let sku = non_blank(context.recommended_sku.as_deref());
        let activity = non_blank(context.recent_event_type.as_deref()).map(|t| t.replace('_', " "));

        match (sku, activity) {
            (Some(sku), Some(activity)) => EmailCopy {
                subject: format!("{name}, still thinking about {sku}?"),
                body: format!(
                    "Hi {name},\n\nThanks for your recent {activity}. {sku} is still available \
                     and we saved it for you.\n\nPick up where you left off any time."
                ),
            },
            (Some(sku), None) => EmailCopy {
                subject: format!("{name}, {sku} is waiting for you"),
                body: format!(
                    "Hi {name},\n\nWe think you'll like {sku}. Take another look while it's \
                     in stock."
                ),
            },
            (None, Some(activity)) => EmailCopy {
                subject: format!("{name}, thanks for your recent {activity}"),
                body: format!(
                    "Hi {name},\n\nWe noticed your recent {activity} and put together a few \
                     picks we think you'll enjoy."
                ),
            },
            (None, None) => EmailCopy {
                subject: format!("{name}, we have something new for you"),
                body: format!(
                    "Hi {name},\n\nIt's been a while. Come see what's new since your last visit."
                ),
            },
        }
    }
}

#[async_trait]
impl DraftAssistant for MockDraftAssistant {
    async fn draft_email(&self, context: &DraftContext) -> Result<EmailCopy, DomainError> {
        Ok(self.compose(context))
    }
}
