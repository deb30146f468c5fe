use async_trait::async_trait;

use saaswatch_core::AppResult;
use saaswatch_domain::{AgentDetails, AgentSummary};

/// Read-only access to the vendor agent inventory.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Lists registered agents.
    async fn list_agents(&self) -> AppResult<Vec<AgentSummary>>;

    /// Lists agents with their engine statuses.
    async fn list_agent_details(&self) -> AppResult<Vec<AgentDetails>>;
}
