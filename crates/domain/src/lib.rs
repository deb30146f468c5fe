//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod agent;
mod login_event;
mod security_log;

pub use agent::{AgentDetails, AgentEngine, AgentEngineStatus, AgentEngineStatusLine, AgentSummary};
pub use login_event::{LOGIN_EVENT_NAME, LoginEvent};
pub use security_log::{ActionEvent, SecurityLogEntry, parse_entry_time};
