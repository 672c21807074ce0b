//! Segment rule definitions.
//!
//! Definitions arrive as untrusted JSON (from clients, or from a text
//! generation backend) and are parsed into the closed [`SegmentDefinition`]
//! set. Every string field is trimmed before it is accepted, so the
//! serialized form of a parsed definition is its canonical form.

use beacon_core::audience::{AudiencePattern, AudienceQuery, split_property_path};
use beacon_core::error::DomainError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a definition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The value was an array, scalar or null.
    #[error("segment definition must be a JSON object")]
    NotAnObject,

    /// `kind` is absent or not a string.
    #[error("segment definition requires a string field `kind`")]
    MissingKind,

    /// `kind` names no known variant.
    #[error("unknown segment kind: {0}")]
    UnknownKind(String),

    /// A required string field is absent, not a string, or blank.
    #[error("`{0}` must be a non-empty string")]
    EmptyString(&'static str),

    /// A string field (blank allowed) is absent or not a string.
    #[error("`{0}` must be a string")]
    NotAString(&'static str),

    /// A string field holds a NUL character.
    #[error("`{0}` must not contain NUL characters")]
    ContainsNul(&'static str),

    /// A count or window is absent, fractional, zero or negative.
    #[error("`{0}` must be a positive integer")]
    NotPositiveInteger(&'static str),
}

impl From<DefinitionError> for DomainError {
    fn from(err: DefinitionError) -> Self {
        DomainError::Validation(err.to_string())
    }
}

/// A validated audience rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentDefinition {
    /// Customers with at least one `event_type` event in the last `days` days.
    #[serde(rename_all = "camelCase")]
    EventTypeInLastDays {
        /// Event type to match.
        event_type: String,
        /// Window length in days.
        days: u32,
    },

    /// Customers with at least one `event_type` event in the last `days` days
    /// whose property at `path` equals `value`.
    #[serde(rename_all = "camelCase")]
    EventPropertyEquals {
        /// Event type to match.
        event_type: String,
        /// Dot-separated property path.
        path: String,
        /// Expected value; may be empty.
        value: String,
        /// Window length in days.
        days: u32,
    },

    /// Customers with at least `min_count` `event_type` events in the last
    /// `days` days.
    #[serde(rename_all = "camelCase")]
    EventCountGteInLastDays {
        /// Event type to match.
        event_type: String,
        /// Window length in days.
        days: u32,
        /// Minimum number of events.
        min_count: u32,
    },
}

impl SegmentDefinition {
    /// Parses and type-checks an untrusted definition.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] describing the first offending field.
    pub fn parse(value: &Value) -> Result<Self, DefinitionError> {
        let Value::Object(fields) = value else {
            return Err(DefinitionError::NotAnObject);
        };
        let kind = fields
            .get("kind")
            .and_then(Value::as_str)
            .ok_or(DefinitionError::MissingKind)?;

        match kind.trim() {
            "event_type_in_last_days" => Ok(Self::EventTypeInLastDays {
                event_type: non_empty_string(fields, "eventType")?,
                days: positive_integer(fields, "days")?,
            }),
            "event_property_equals" => Ok(Self::EventPropertyEquals {
                event_type: non_empty_string(fields, "eventType")?,
                path: property_path(fields)?,
                value: any_string(fields, "value")?,
                days: positive_integer(fields, "days")?,
            }),
            "event_count_gte_in_last_days" => Ok(Self::EventCountGteInLastDays {
                event_type: non_empty_string(fields, "eventType")?,
                days: positive_integer(fields, "days")?,
                min_count: positive_integer(fields, "minCount")?,
            }),
            other => Err(DefinitionError::UnknownKind(other.to_owned())),
        }
    }

    /// Event type every variant filters on.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::EventTypeInLastDays { event_type, .. }
            | Self::EventPropertyEquals { event_type, .. }
            | Self::EventCountGteInLastDays { event_type, .. } => event_type,
        }
    }

    /// Window length in days.
    #[must_use]
    pub fn days(&self) -> u32 {
        match self {
            Self::EventTypeInLastDays { days, .. }
            | Self::EventPropertyEquals { days, .. }
            | Self::EventCountGteInLastDays { days, .. } => *days,
        }
    }

    /// Earliest occurrence time inside the window ending at `now`.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(TimeDelta::days(i64::from(self.days())))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Lowers the definition into the storage-level query for the window
    /// ending at `now`.
    #[must_use]
    pub fn to_audience_query(&self, now: DateTime<Utc>) -> AudienceQuery {
        let pattern = match self {
            Self::EventTypeInLastDays { .. } => AudiencePattern::AnyEvent,
            Self::EventPropertyEquals { path, value, .. } => AudiencePattern::PropertyEquals {
                path: split_property_path(path),
                value: value.clone(),
            },
            Self::EventCountGteInLastDays { min_count, .. } => AudiencePattern::MinCount(*min_count),
        };
        AudienceQuery {
            event_type: self.event_type().to_owned(),
            since: self.cutoff(now),
            pattern,
        }
    }

    /// Canonical JSON form, wire-compatible with [`SegmentDefinition::parse`].
    #[must_use]
    pub fn to_json(&self) -> Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(self).expect("SegmentDefinition serialization is infallible")
    }
}

/// A dotted path with at least one non-blank segment.
fn property_path(fields: &Map<String, Value>) -> Result<String, DefinitionError> {
    let path = non_empty_string(fields, "path")?;
    if split_property_path(&path).is_empty() {
        return Err(DefinitionError::EmptyString("path"));
    }
    Ok(path)
}

fn non_empty_string(fields: &Map<String, Value>, name: &'static str) -> Result<String, DefinitionError> {
    match fields.get(name).and_then(Value::as_str).map(str::trim) {
        Some(s) if s.contains('\0') => Err(DefinitionError::ContainsNul(name)),
        Some(s) if !s.is_empty() => Ok(s.to_owned()),
        _ => Err(DefinitionError::EmptyString(name)),
    }
}

fn any_string(fields: &Map<String, Value>, name: &'static str) -> Result<String, DefinitionError> {
    let value = fields
        .get(name)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_owned())
        .ok_or(DefinitionError::NotAString(name))?;
    if value.contains('\0') {
        return Err(DefinitionError::ContainsNul(name));
    }
    Ok(value)
}

fn positive_integer(fields: &Map<String, Value>, name: &'static str) -> Result<u32, DefinitionError> {
    fields
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or(DefinitionError::NotPositiveInteger(name))
}
