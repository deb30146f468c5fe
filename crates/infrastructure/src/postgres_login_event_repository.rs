use async_trait::async_trait;
use sqlx::PgPool;

use saaswatch_application::{LoginEventRepository, LoginInsertOutcome};
use saaswatch_core::{AppError, AppResult};
use saaswatch_domain::LoginEvent;

/// PostgreSQL-backed repository for login events.
///
/// Relies on the unique index over the lower-cased natural key of
/// `environment_usage_events`; inserts that hit it are reported as
/// duplicates.
#[derive(Clone)]
pub struct PostgresLoginEventRepository {
    pool: PgPool,
}

impl PostgresLoginEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginEventRepository for PostgresLoginEventRepository {
    async fn login_event_exists(&self, event: &LoginEvent) -> AppResult<bool> {
        let existing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT event_id
            FROM environment_usage_events
            WHERE lower(environment_name) = lower($1)
              AND lower(event_name) = lower($2)
              AND lower(user_id) = lower($3)
              AND event_time = $4
            LIMIT 1
            "#,
        )
        .bind(event.environment_name())
        .bind(event.event_name())
        .bind(event.user_id())
        .bind(event.event_time())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to look up login event for '{}' at {}: {error}",
                event.user_id(),
                event.event_time()
            ))
        })?;

        Ok(existing.is_some())
    }

    async fn insert_login_event(&self, event: &LoginEvent) -> AppResult<LoginInsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO environment_usage_events (
                environment_name,
                event_name,
                user_id,
                event_time
            )
            VALUES (lower($1), lower($2), lower($3), $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(event.environment_name())
        .bind(event.event_name())
        .bind(event.user_id())
        .bind(event.event_time())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to insert login event for '{}' at {}: {error}",
                event.user_id(),
                event.event_time()
            ))
        })?;

        if result.rows_affected() == 0 {
            return Ok(LoginInsertOutcome::Duplicate);
        }

        Ok(LoginInsertOutcome::Inserted)
    }
}
