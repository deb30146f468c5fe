//! Agent health records from the vendor agent API.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Summary row from the agent listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    /// Vendor agent identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Agent display name.
    #[serde(default)]
    pub name: String,
    /// Whether the agent is enabled.
    #[serde(default)]
    pub active: Option<bool>,
    /// Whether the agent can currently run jobs.
    #[serde(default)]
    pub ready_to_run: Option<bool>,
    /// Host platform label.
    #[serde(default)]
    pub platform: Option<String>,
    /// Installed agent version.
    #[serde(default)]
    pub agent_version: Option<String>,
}

/// Detailed agent record including its engines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetails {
    /// Agent display name.
    #[serde(default)]
    pub name: String,
    /// Engines hosted by the agent.
    #[serde(default)]
    pub agent_engines: Vec<AgentEngine>,
}

/// One engine (application service) hosted by an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEngine {
    /// Reported engine status.
    #[serde(default)]
    pub agent_engine_status: AgentEngineStatus,
}

/// Desired and observed status of an engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEngineStatus {
    /// Human-readable engine name.
    #[serde(default)]
    pub app_display_name: String,
    /// Status the engine should be in.
    #[serde(default)]
    pub desired_status: String,
    /// Status the engine is in.
    #[serde(default)]
    pub status: String,
}

/// Flattened agent/engine status used for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEngineStatusLine {
    /// Agent display name.
    pub agent_name: String,
    /// Engine display name.
    pub app_name: String,
    /// Desired engine status.
    pub desired_status: String,
    /// Current engine status.
    pub status: String,
}

impl AgentEngineStatusLine {
    /// Flattens agent details into one line per engine.
    #[must_use]
    pub fn from_details(details: &AgentDetails) -> Vec<Self> {
        details
            .agent_engines
            .iter()
            .map(|engine| Self {
                agent_name: details.name.clone(),
                app_name: engine.agent_engine_status.app_display_name.clone(),
                desired_status: engine.agent_engine_status.desired_status.clone(),
                status: engine.agent_engine_status.status.clone(),
            })
            .collect()
    }

    /// Returns whether the engine is in its desired state.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.desired_status.eq_ignore_ascii_case(self.status.as_str())
    }
}

impl Display for AgentEngineStatusLine {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{} / {} / desired: {} / current: {}",
            self.agent_name, self.app_name, self.desired_status, self.status
        )
    }
}
