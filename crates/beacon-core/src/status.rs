//! Lifecycle statuses for campaigns, drafts and sends.
//!
//! Statuses are persisted as lowercase text; `as_str` and `FromStr` are the
//! only conversions the storage layer uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when persisted or client-supplied text names no known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status: {value}")]
pub struct UnknownStatus {
    /// Which status family was being parsed.
    pub kind: &'static str,
    /// The rejected text.
    pub value: String,
}

/// Campaign lifecycle: `draft → drafted → sending → sent | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Created, no drafts generated yet.
    Draft,
    /// At least one email draft exists.
    Drafted,
    /// Send simulation in progress.
    Sending,
    /// At least one send succeeded.
    Sent,
    /// Every attempted send failed.
    Failed,
}

impl CampaignStatus {
    /// Persisted text form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Drafted => "drafted",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "drafted" => Ok(Self::Drafted),
            "sending" => Ok(Self::Sending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus {
                kind: "campaign",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Email draft review state. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Produced by draft generation, awaiting review.
    Generated,
    /// Accepted for sending.
    Approved,
    /// Excluded from sending.
    Rejected,
}

impl DraftStatus {
    /// Persisted text form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether no further review transition is allowed.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl FromStr for DraftStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generated" => Ok(Self::Generated),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus {
                kind: "draft",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-recipient send state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    /// Recorded but not yet delivered.
    Queued,
    /// Delivered.
    Sent,
    /// Delivery failed.
    Failed,
}

impl SendStatus {
    /// Persisted text form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for SendStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus {
                kind: "send",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
