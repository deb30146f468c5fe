use async_trait::async_trait;

use saaswatch_core::AppResult;
use saaswatch_domain::{LoginEvent, SecurityLogEntry};

/// Number of security-log entries requested per poll.
pub const DEFAULT_SECURITY_LOG_LIMIT: u32 = 1000;

/// Source of recent security-log entries.
#[async_trait]
pub trait SecurityLogSource: Send + Sync {
    /// Fetches up to `limit` of the most recent entries.
    ///
    /// Implementations authenticate on first use.
    async fn fetch_security_log(&self, limit: u32) -> AppResult<Vec<SecurityLogEntry>>;
}

/// Result of an insert attempt against the login event store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginInsertOutcome {
    /// A new row was written.
    Inserted,
    /// The unique key constraint already held a matching row.
    Duplicate,
}

/// Repository port for login event persistence.
///
/// Implementations must enforce uniqueness of the natural key themselves;
/// [`LoginEventRepository::login_event_exists`] is only a pre-check.
#[async_trait]
pub trait LoginEventRepository: Send + Sync {
    /// Returns whether an event with the same natural key is stored.
    async fn login_event_exists(&self, event: &LoginEvent) -> AppResult<bool>;

    /// Inserts the event unless the natural key is already taken.
    async fn insert_login_event(&self, event: &LoginEvent) -> AppResult<LoginInsertOutcome>;
}
