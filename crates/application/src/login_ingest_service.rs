use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use saaswatch_core::{AppError, AppResult};
use saaswatch_domain::{LoginEvent, SecurityLogEntry};

use crate::login_ports::{LoginEventRepository, LoginInsertOutcome};

/// Outcome of recording one login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRecordOutcome {
    /// The login was persisted by this call.
    Recorded,
    /// A matching login was already stored.
    AlreadyRecorded,
}

/// Counters for one batch of security-log entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginIngestReport {
    /// Entries classified as user logins.
    pub login_entries: usize,
    /// Entries with any other action.
    pub ignored: usize,
    /// Logins newly persisted.
    pub recorded: usize,
    /// Logins that were already stored.
    pub already_recorded: usize,
    /// Logins skipped because the entry could not be interpreted.
    pub skipped: usize,
    /// Logins the store failed to persist.
    pub persistence_failures: usize,
}

/// Application service turning security-log entries into stored logins.
#[derive(Clone)]
pub struct LoginIngestService {
    repository: Arc<dyn LoginEventRepository>,
}

impl LoginIngestService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn LoginEventRepository>) -> Self {
        Self { repository }
    }

    /// Records one login unless the same normalized key is already stored.
    pub async fn record_login(
        &self,
        environment: &str,
        user_id: &str,
        login_timestamp: NaiveDateTime,
    ) -> AppResult<LoginRecordOutcome> {
        let event = LoginEvent::new(environment, user_id, login_timestamp)?;

        if self.repository.login_event_exists(&event).await? {
            debug!(
                environment = %event.environment_name(),
                user_id = %event.user_id(),
                event_time = %event.event_time(),
                "login event already recorded"
            );
            return Ok(LoginRecordOutcome::AlreadyRecorded);
        }

        match self.repository.insert_login_event(&event).await? {
            LoginInsertOutcome::Inserted => {
                info!(
                    environment = %event.environment_name(),
                    user_id = %event.user_id(),
                    event_time = %event.event_time(),
                    "login event recorded"
                );
                Ok(LoginRecordOutcome::Recorded)
            }
            LoginInsertOutcome::Duplicate => {
                debug!(
                    environment = %event.environment_name(),
                    user_id = %event.user_id(),
                    event_time = %event.event_time(),
                    "login event recorded concurrently"
                );
                Ok(LoginRecordOutcome::AlreadyRecorded)
            }
        }
    }

    /// Records every login entry of a fetched batch.
    ///
    /// Failures are isolated per entry and reported through the counters.
    pub async fn process_entries(
        &self,
        environment: &str,
        entries: &[SecurityLogEntry],
    ) -> LoginIngestReport {
        let mut report = LoginIngestReport::default();

        for entry in entries {
            if !entry.is_login() {
                report.ignored += 1;
                continue;
            }
            report.login_entries += 1;

            let parsed = entry
                .actor()
                .and_then(|actor| Ok((actor, entry.parsed_entry_time()?)));
            let (actor, entry_time) = match parsed {
                Ok(parsed) => parsed,
                Err(error) => {
                    report.skipped += 1;
                    warn!(
                        actor = entry.actor.as_deref().unwrap_or("<missing>"),
                        entry_time = entry.entry_time.as_deref().unwrap_or("<missing>"),
                        error = %error,
                        "skipping malformed login entry"
                    );
                    continue;
                }
            };

            match self.record_login(environment, actor, entry_time).await {
                Ok(LoginRecordOutcome::Recorded) => report.recorded += 1,
                Ok(LoginRecordOutcome::AlreadyRecorded) => report.already_recorded += 1,
                Err(error @ (AppError::Validation(_) | AppError::Parse(_))) => {
                    report.skipped += 1;
                    warn!(
                        user_id = %actor,
                        event_time = %entry_time,
                        error = %error,
                        "skipping invalid login entry"
                    );
                }
                Err(error) => {
                    report.persistence_failures += 1;
                    error!(
                        environment = %environment,
                        user_id = %actor,
                        event_time = %entry_time,
                        error = %error,
                        "failed to persist login event"
                    );
                }
            }
        }

        report
    }
}
