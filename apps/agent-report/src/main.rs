//! Prints agent engine statuses for one vendor organization.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use saaswatch_application::AgentReportService;
use saaswatch_core::AppError;
use saaswatch_infrastructure::{IicsCredentials, IicsSessionClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let credentials = IicsCredentials::from_env()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let client = Arc::new(IicsSessionClient::new(http_client, credentials));
    let service = AgentReportService::new(client);

    let report = service.build_report().await?;

    info!(
        agents = report.agents.len(),
        ready_agents = report
            .agents
            .iter()
            .filter(|agent| agent.ready_to_run == Some(true))
            .count(),
        engines = report.engines.len(),
        "agent report loaded"
    );

    for line in &report.engines {
        println!("{line}");
    }

    for line in report.unhealthy_engines() {
        warn!(
            agent = %line.agent_name,
            app = %line.app_name,
            desired_status = %line.desired_status,
            status = %line.status,
            "agent engine is not in its desired state"
        );
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            env::var("LOG_LEVEL")
                .ok()
                .filter(|level| !level.trim().is_empty())
                .and_then(|level| EnvFilter::try_new(level.trim().to_lowercase()).ok())
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
