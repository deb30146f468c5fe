use std::sync::Arc;

use saaswatch_core::AppResult;
use saaswatch_domain::{AgentEngineStatusLine, AgentSummary};

use crate::agent_ports::AgentDirectory;

/// Agent inventory plus flattened engine statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentReport {
    /// Registered agents.
    pub agents: Vec<AgentSummary>,
    /// One line per engine across all agents.
    pub engines: Vec<AgentEngineStatusLine>,
}

impl AgentReport {
    /// Returns engines whose current status differs from the desired one.
    pub fn unhealthy_engines(&self) -> impl Iterator<Item = &AgentEngineStatusLine> {
        self.engines.iter().filter(|line| !line.is_healthy())
    }
}

/// Read-only reporting over the agent directory.
#[derive(Clone)]
pub struct AgentReportService {
    directory: Arc<dyn AgentDirectory>,
}

impl AgentReportService {
    /// Creates a service from a directory implementation.
    #[must_use]
    pub fn new(directory: Arc<dyn AgentDirectory>) -> Self {
        Self { directory }
    }

    /// Lists registered agents.
    pub async fn agent_overview(&self) -> AppResult<Vec<AgentSummary>> {
        self.directory.list_agents().await
    }

    /// Flattens agent details into engine status lines.
    pub async fn engine_status_lines(&self) -> AppResult<Vec<AgentEngineStatusLine>> {
        let details = self.directory.list_agent_details().await?;
        Ok(details
            .iter()
            .flat_map(AgentEngineStatusLine::from_details)
            .collect())
    }

    /// Builds the full report.
    pub async fn build_report(&self) -> AppResult<AgentReport> {
        Ok(AgentReport {
            agents: self.agent_overview().await?,
            engines: self.engine_status_lines().await?,
        })
    }
}
