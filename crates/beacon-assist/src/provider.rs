//! Provider traits and startup selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use beacon_core::error::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mock_draft::MockDraftAssistant;
use crate::mock_segment::MockSegmentAssistant;

/// Generates a segment definition from a natural-language prompt.
///
/// The returned JSON is untrusted; callers must validate it before use.
#[async_trait]
pub trait SegmentAssistant: Send + Sync {
    /// Suggests a definition for `prompt`.
    async fn suggest_definition(&self, prompt: &str) -> Result<serde_json::Value, DomainError>;
}

/// What a draft writer knows about one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftContext {
    /// Recipient email.
    pub email: String,
    /// Type of the recipient's most recent event.
    #[serde(default)]
    pub recent_event_type: Option<String>,
    /// Product SKU to feature.
    #[serde(default)]
    pub recommended_sku: Option<String>,
}

/// Generated subject and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailCopy {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Writes email copy for one recipient.
#[async_trait]
pub trait DraftAssistant: Send + Sync {
    /// Produces a subject/body pair for `context`.
    async fn draft_email(&self, context: &DraftContext) -> Result<EmailCopy, DomainError>;
}

/// Returned when configuration names no known provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown assist provider: {0}")]
pub struct UnknownProvider(pub String);

/// Provider families selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistProvider {
    /// Deterministic keyword and template providers.
    #[default]
    Mock,
}

impl AssistProvider {
    /// Instantiates both providers of this family.
    #[must_use]
    pub fn build(self) -> AssistProviders {
        match self {
            Self::Mock => AssistProviders {
                segments: Arc::new(MockSegmentAssistant::new()),
                drafts: Arc::new(MockDraftAssistant),
            },
        }
    }
}

impl FromStr for AssistProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            other => Err(UnknownProvider(other.to_owned())),
        }
    }
}

impl fmt::Display for AssistProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => f.write_str("mock"),
        }
    }
}

/// The pair of providers injected into request handlers.
#[derive(Clone)]
pub struct AssistProviders {
    /// Segment-from-prompt provider.
    pub segments: Arc<dyn SegmentAssistant>,
    /// Draft-from-context provider.
    pub drafts: Arc<dyn DraftAssistant>,
}

impl fmt::Debug for AssistProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistProviders").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parses_case_insensitively() {
        assert_eq!(" Mock ".parse::<AssistProvider>(), Ok(AssistProvider::Mock));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = "openai".parse::<AssistProvider>().unwrap_err();
        assert_eq!(err.to_string(), "unknown assist provider: openai");
    }

    #[tokio::test]
    async fn test_mock_family_builds_working_providers() {
        let providers = AssistProvider::Mock.build();

        let copy = providers
            .drafts
            .draft_email(&DraftContext {
                email: "sam@example.com".to_owned(),
                recent_event_type: None,
                recommended_sku: None,
            })
            .await
            .unwrap();

        assert!(copy.subject.contains("sam"));
    }
}
