//! Application services and ports.

#![forbid(unsafe_code)]

mod agent_ports;
mod agent_report_service;
mod login_ingest_service;
mod login_ports;
mod login_sync_job;

pub use agent_ports::AgentDirectory;
pub use agent_report_service::{AgentReport, AgentReportService};
pub use login_ingest_service::{LoginIngestReport, LoginIngestService, LoginRecordOutcome};
pub use login_ports::{
    DEFAULT_SECURITY_LOG_LIMIT, LoginEventRepository, LoginInsertOutcome, SecurityLogSource,
};
pub use login_sync_job::{LoginSyncJob, LoginSyncReport};
