use std::sync::Arc;

use tracing::info;

use saaswatch_core::{AppError, AppResult, NonEmptyString};

use crate::login_ingest_service::{LoginIngestReport, LoginIngestService};
use crate::login_ports::SecurityLogSource;

/// Summary of one completed sync tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginSyncReport {
    /// Entries returned by the security log.
    pub fetched: usize,
    /// Per-entry ingest counters.
    pub ingest: LoginIngestReport,
}

/// One login-sync tick: fetch the security log and record its logins.
#[derive(Clone)]
pub struct LoginSyncJob {
    source: Arc<dyn SecurityLogSource>,
    ingest: LoginIngestService,
    environment: NonEmptyString,
    limit: u32,
}

impl LoginSyncJob {
    /// Creates a job for one environment label.
    #[must_use]
    pub fn new(
        source: Arc<dyn SecurityLogSource>,
        ingest: LoginIngestService,
        environment: NonEmptyString,
        limit: u32,
    ) -> Self {
        Self {
            source,
            ingest,
            environment,
            limit,
        }
    }

    /// Runs one tick.
    ///
    /// Fetch failures abort the tick before anything is persisted. Per-row
    /// persistence failures are reported after the whole batch was tried.
    pub async fn run_once(&self) -> AppResult<LoginSyncReport> {
        let entries = self.source.fetch_security_log(self.limit).await?;
        let ingest = self
            .ingest
            .process_entries(self.environment.as_str(), &entries)
            .await;
        let report = LoginSyncReport {
            fetched: entries.len(),
            ingest,
        };

        info!(
            environment = %self.environment.as_str(),
            fetched = report.fetched,
            login_entries = ingest.login_entries,
            recorded = ingest.recorded,
            already_recorded = ingest.already_recorded,
            skipped = ingest.skipped,
            persistence_failures = ingest.persistence_failures,
            "login sync tick finished"
        );

        if ingest.persistence_failures > 0 {
            return Err(AppError::Persistence(format!(
                "{} of {} login events could not be persisted",
                ingest.persistence_failures, ingest.login_entries
            )));
        }

        Ok(report)
    }
}
