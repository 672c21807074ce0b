//! Input normalization for ingested events.

use thiserror::Error;

/// Longest accepted idempotency key, matching the column width.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;
/// Longest accepted event type, matching the column width.
pub const MAX_EVENT_TYPE_LEN: usize = 255;

/// Why ingestion input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// Email is blank or not `local@domain`.
    #[error("`email` must be a valid email address")]
    InvalidEmail,
    /// Event type is blank or too long.
    #[error("`type` must be a non-empty string of at most 255 characters")]
    InvalidEventType,
    /// Properties is present but not a JSON object.
    #[error("`properties` must be a JSON object")]
    PropertiesNotAnObject,
    /// A key or string inside properties holds a NUL character.
    #[error("`properties` must not contain NUL characters")]
    PropertiesContainNul,
    /// Idempotency key is too long.
    #[error("idempotency key must be at most 255 characters")]
    IdempotencyKeyTooLong,
}

impl From<IngestError> for beacon_core::error::DomainError {
    fn from(err: IngestError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Trims and lowercases an email, rejecting anything that is not
/// `local@domain` with both parts non-empty.
///
/// # Errors
///
/// Returns `IngestError::InvalidEmail` for malformed input.
pub fn normalize_email(raw: &str) -> Result<String, IngestError> {
    let email = raw.trim().to_lowercase();
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty()
                && !domain.is_empty()
                && !email.contains(|c: char| c.is_whitespace() || c == '\0') =>
        {
            Ok(email)
        }
        _ => Err(IngestError::InvalidEmail),
    }
}

/// Trims an event type.
///
/// # Errors
///
/// Returns `IngestError::InvalidEventType` when blank, too long or holding
/// a NUL character.
pub fn normalize_event_type(raw: &str) -> Result<String, IngestError> {
    let event_type = raw.trim();
    if event_type.is_empty()
        || event_type.contains('\0')
        || event_type.chars().count() > MAX_EVENT_TYPE_LEN
    {
        return Err(IngestError::InvalidEventType);
    }
    Ok(event_type.to_owned())
}

/// Defaults absent properties to `{}` and rejects non-objects.
///
/// # Errors
///
/// Returns `IngestError::PropertiesNotAnObject` for arrays, scalars and null,
/// and `IngestError::PropertiesContainNul` when any nested key or string
/// holds a NUL character (jsonb cannot store one).
pub fn normalize_properties(
    raw: Option<serde_json::Value>,
) -> Result<serde_json::Value, IngestError> {
    match raw {
        None => Ok(serde_json::Value::Object(serde_json::Map::new())),
        Some(value @ serde_json::Value::Object(_)) if contains_nul(&value) => {
            Err(IngestError::PropertiesContainNul)
        }
        Some(value @ serde_json::Value::Object(_)) => Ok(value),
        Some(_) => Err(IngestError::PropertiesNotAnObject),
    }
}

fn contains_nul(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::String(s) => s.contains('\0'),
        serde_json::Value::Array(items) => items.iter().any(contains_nul),
        serde_json::Value::Object(fields) => fields
            .iter()
            .any(|(key, nested)| key.contains('\0') || contains_nul(nested)),
        _ => false,
    }
}

/// Trims an idempotency key; a blank key counts as absent.
///
/// # Errors
///
/// Returns `IngestError::IdempotencyKeyTooLong` past 255 characters.
pub fn normalize_idempotency_key(raw: Option<&str>) -> Result<Option<String>, IngestError> {
    let Some(key) = raw.map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(None);
    };
    if key.chars().count() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(IngestError::IdempotencyKeyTooLong);
    }
    Ok(Some(key.to_owned()))
}
