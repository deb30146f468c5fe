//! Vendor security-log records and their timestamp format.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDateTime};
use saaswatch_core::{AppError, AppResult};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Classification of an audited account action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionEvent {
    /// A user signed in.
    UserLogin,
    /// Any action this system does not consume.
    Other(String),
}

impl ActionEvent {
    /// Returns the vendor wire value for this action.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserLogin => "USER_LOGIN",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl Default for ActionEvent {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ActionEvent {
    fn from(value: String) -> Self {
        if value == "USER_LOGIN" {
            Self::UserLogin
        } else {
            Self::Other(value)
        }
    }
}

impl From<ActionEvent> for String {
    fn from(value: ActionEvent) -> Self {
        match value {
            ActionEvent::UserLogin => "USER_LOGIN".to_owned(),
            ActionEvent::Other(value) => value,
        }
    }
}

impl Display for ActionEvent {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One entry of the vendor security log.
///
/// Only the fields the login sync consumes are modeled; the vendor sends
/// many more and they are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityLogEntry {
    /// Action classification.
    #[serde(default, deserialize_with = "lenient_action_event")]
    pub action_event: ActionEvent,
    /// Acting user name, compared case-insensitively.
    #[serde(default, deserialize_with = "lenient_string")]
    pub actor: Option<String>,
    /// Raw vendor timestamp, e.g. `2024-01-01T10:00:00.000Z`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub entry_time: Option<String>,
}

/// Accepts any JSON value; only strings are kept.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientString {
    Text(String),
    Other(IgnoredAny),
}

// Null or non-string fields must not fail the whole security-log page.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientString::deserialize(deserializer)? {
        LenientString::Text(value) => Some(value),
        LenientString::Other(_) => None,
    })
}

fn lenient_action_event<'de, D>(deserializer: D) -> Result<ActionEvent, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?
        .map(ActionEvent::from)
        .unwrap_or_default())
}

impl SecurityLogEntry {
    /// Returns whether the entry records a user login.
    #[must_use]
    pub fn is_login(&self) -> bool {
        self.action_event == ActionEvent::UserLogin
    }

    /// Returns the actor, failing when it is absent or blank.
    pub fn actor(&self) -> AppResult<&str> {
        self.actor
            .as_deref()
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .ok_or_else(|| {
                AppError::Parse(format!(
                    "security log entry '{}' has no actor",
                    self.action_event
                ))
            })
    }

    /// Parses the entry time.
    pub fn parsed_entry_time(&self) -> AppResult<NaiveDateTime> {
        let raw = self.entry_time.as_deref().ok_or_else(|| {
            AppError::Parse(format!(
                "security log entry '{}' has no entryTime",
                self.action_event
            ))
        })?;

        parse_entry_time(raw)
    }
}

/// Parses a vendor entry time into a naive timestamp.
///
/// A trailing `Z` designator is dropped and the remainder read as naive
/// wall-clock time. Explicit numeric offsets are normalized to UTC.
pub fn parse_entry_time(value: &str) -> AppResult<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Parse("entry time must not be empty".to_owned()));
    }

    if let Some(naive) = trimmed.strip_suffix(['Z', 'z']) {
        return parse_naive(naive).ok_or_else(|| invalid_entry_time(value));
    }

    if let Some(parsed) = parse_naive(trimmed) {
        return Ok(parsed);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|parsed| parsed.naive_utc())
        .map_err(|_| invalid_entry_time(value))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn invalid_entry_time(value: &str) -> AppError {
    AppError::Parse(format!("invalid entry time '{value}'"))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{ActionEvent, SecurityLogEntry, parse_entry_time};

    fn timestamp(hour: u32, minute: u32, second: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_milli_opt(hour, minute, second, milli))
            .unwrap_or_default()
    }

    #[test]
    fn strips_trailing_zulu_designator() {
        let parsed = parse_entry_time("2024-01-01T10:00:00Z");
        assert_eq!(parsed.ok(), Some(timestamp(10, 0, 0, 0)));
    }

    #[test]
    fn keeps_fractional_seconds() {
        let parsed = parse_entry_time("2024-01-01T10:00:00.250Z");
        assert_eq!(parsed.ok(), Some(timestamp(10, 0, 0, 250)));
    }

    #[test]
    fn accepts_naive_value_without_designator() {
        let parsed = parse_entry_time("2024-01-01 10:00:00");
        assert_eq!(parsed.ok(), Some(timestamp(10, 0, 0, 0)));
    }

    #[test]
    fn normalizes_numeric_offset_to_utc() {
        let parsed = parse_entry_time("2024-01-01T15:30:00+05:30");
        assert_eq!(parsed.ok(), Some(timestamp(10, 0, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_entry_time("yesterday").is_err());
        assert!(parse_entry_time("").is_err());
        assert!(parse_entry_time("2024-13-01T10:00:00Z").is_err());
    }

    #[test]
    fn deserializes_vendor_entry_ignoring_unknown_fields() {
        let raw = serde_json::json!({
            "id": "0a1b",
            "orgId": "org",
            "actionEvent": "USER_LOGIN",
            "actor": "Bob",
            "entryTime": "2024-01-01T10:00:00.000Z",
            "objectName": "Bob"
        });

        let entry = serde_json::from_value::<SecurityLogEntry>(raw);
        let Ok(entry) = entry else {
            panic!("vendor entry should deserialize");
        };

        assert!(entry.is_login());
        assert_eq!(entry.actor().ok(), Some("Bob"));
        assert_eq!(entry.parsed_entry_time().ok(), Some(timestamp(10, 0, 0, 0)));
    }

    #[test]
    fn odd_field_types_only_invalidate_their_own_entry() {
        let raw = serde_json::json!([
            {"actionEvent": "USER_LOGIN", "actor": "alice", "entryTime": "2024-01-01T10:00:00Z"},
            {"actionEvent": null, "actor": "bob", "entryTime": "2024-01-01T10:00:00Z"},
            {"actionEvent": "USER_LOGIN", "actor": 42, "entryTime": 1704103200000_u64}
        ]);

        let entries = serde_json::from_value::<Vec<SecurityLogEntry>>(raw);
        let Ok(entries) = entries else {
            panic!("batch with odd field types should deserialize");
        };

        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_login());
        assert!(!entries[1].is_login());
        assert_eq!(entries[1].action_event, ActionEvent::default());
        assert!(entries[2].is_login());
        assert_eq!(entries[2].actor, None);
        assert!(matches!(
            entries[2].parsed_entry_time(),
            Err(saaswatch_core::AppError::Parse(_))
        ));
    }

    #[test]
    fn other_actions_round_trip_their_wire_value() {
        let action = ActionEvent::from("USER_LOGOUT".to_owned());
        assert_eq!(action, ActionEvent::Other("USER_LOGOUT".to_owned()));
        assert_eq!(action.as_str(), "USER_LOGOUT");
    }

    #[test]
    fn missing_actor_is_a_parse_error() {
        let entry = SecurityLogEntry {
            action_event: ActionEvent::UserLogin,
            actor: Some("  ".to_owned()),
            entry_time: Some("2024-01-01T10:00:00Z".to_owned()),
        };

        assert!(matches!(
            entry.actor(),
            Err(saaswatch_core::AppError::Parse(_))
        ));
    }
}
