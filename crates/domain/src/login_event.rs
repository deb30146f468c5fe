//! Persisted login events and their natural key.

use chrono::NaiveDateTime;
use saaswatch_core::{AppError, AppResult, NonEmptyString};

/// Event name stored for every login event.
pub const LOGIN_EVENT_NAME: &str = "login";

/// A user login observed in one environment.
///
/// The string parts of the natural key are trimmed and lower-cased on
/// construction, so two events that differ only by case compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginEvent {
    environment_name: NonEmptyString,
    event_name: NonEmptyString,
    user_id: NonEmptyString,
    event_time: NaiveDateTime,
}

impl LoginEvent {
    /// Creates a normalized login event.
    pub fn new(
        environment_name: &str,
        user_id: &str,
        event_time: NaiveDateTime,
    ) -> AppResult<Self> {
        Ok(Self {
            environment_name: normalize_key_part("environment name", environment_name)?,
            event_name: normalize_key_part("event name", LOGIN_EVENT_NAME)?,
            user_id: normalize_key_part("user id", user_id)?,
            event_time,
        })
    }

    /// Returns the lower-cased environment label.
    #[must_use]
    pub fn environment_name(&self) -> &str {
        self.environment_name.as_str()
    }

    /// Returns the lower-cased event name.
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.event_name.as_str()
    }

    /// Returns the lower-cased user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the naive login timestamp.
    #[must_use]
    pub fn event_time(&self) -> NaiveDateTime {
        self.event_time
    }
}

fn normalize_key_part(label: &str, value: &str) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value.trim().to_lowercase())
        .map_err(|_| AppError::Validation(format!("login event {label} must not be empty")))
}
