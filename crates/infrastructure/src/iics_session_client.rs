use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use saaswatch_application::{AgentDirectory, SecurityLogSource};
use saaswatch_core::{AppError, AppResult};
use saaswatch_domain::{AgentDetails, AgentSummary, SecurityLogEntry};

mod credentials;
mod session;

pub use credentials::IicsCredentials;
pub use session::Session;

use session::{LoginRequest, LoginResponse};

/// Session header read by the v3 REST API.
const SESSION_HEADER_V3: &str = "INFA-SESSION-ID";
/// Session header read by the v2 REST API.
const SESSION_HEADER_V2: &str = "icSessionId";

/// Returns the login endpoint for a pod region.
#[must_use]
pub fn login_url_for_region(region: &str) -> String {
    format!("https://dm-{region}.informaticacloud.com/saas/public/core/v3/login")
}

#[derive(Debug, Deserialize)]
struct SecurityLogResponse {
    #[serde(default)]
    entries: Vec<SecurityLogEntry>,
}

/// HTTP client for the vendor REST API with a lazily created session.
///
/// The first authenticated call logs in; the session is then reused for the
/// lifetime of the client. There is no refresh: an expired session surfaces
/// as an upstream error.
#[derive(Debug)]
pub struct IicsSessionClient {
    http_client: reqwest::Client,
    credentials: IicsCredentials,
    login_url: String,
    session: OnceCell<Session>,
}

impl IicsSessionClient {
    /// Creates a client for the credentials' pod region.
    #[must_use]
    pub fn new(http_client: reqwest::Client, credentials: IicsCredentials) -> Self {
        let login_url = login_url_for_region(credentials.region());
        Self::with_login_url(http_client, credentials, login_url)
    }

    /// Creates a client against an explicit login endpoint.
    #[must_use]
    pub fn with_login_url(
        http_client: reqwest::Client,
        credentials: IicsCredentials,
        login_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            credentials,
            login_url: login_url.into(),
            session: OnceCell::new(),
        }
    }

    /// Posts the credentials to the login endpoint and returns a new session.
    ///
    /// Does not replace a session already cached by this client.
    pub async fn authenticate(&self) -> AppResult<Session> {
        debug!(
            login_url = %self.login_url,
            username = %self.credentials.username(),
            "attempting login"
        );

        let response = self
            .http_client
            .post(self.login_url.as_str())
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest {
                username: self.credentials.username(),
                password: self.credentials.password(),
            })
            .send()
            .await
            .map_err(|error| {
                AppError::Authentication(format!(
                    "failed to call login endpoint {}: {error}",
                    self.login_url
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Authentication(format!(
                "login endpoint {} returned status {} for user '{}': {body}",
                self.login_url,
                status.as_u16(),
                self.credentials.username()
            )));
        }

        let body = response.json::<LoginResponse>().await.map_err(|error| {
            AppError::Authentication(format!(
                "failed to parse login response from {}: {error}",
                self.login_url
            ))
        })?;
        let session = Session::from_login_response(body)?;

        info!(
            username = %self.credentials.username(),
            base_api_url = %session.base_api_url(),
            "logged in"
        );

        Ok(session)
    }

    /// Returns the cached session, logging in on first use.
    pub async fn session(&self) -> AppResult<&Session> {
        self.session
            .get_or_try_init(|| self.authenticate())
            .await
    }

    /// Returns whether a session has been established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.initialized()
    }

    /// Fetches the most recent security-log entries.
    pub async fn fetch_security_log(&self, limit: u32) -> AppResult<Vec<SecurityLogEntry>> {
        let response: SecurityLogResponse = self
            .get_json(format!("/public/core/v3/securityLog?limit={limit}").as_str())
            .await?;

        debug!(entries = response.entries.len(), limit, "fetched security log");
        Ok(response.entries)
    }

    /// Lists registered agents.
    pub async fn list_agents(&self) -> AppResult<Vec<AgentSummary>> {
        self.get_json("/api/v2/agent").await
    }

    /// Lists agents with their engine statuses.
    pub async fn list_agent_details(&self) -> AppResult<Vec<AgentDetails>> {
        self.get_json("/api/v2/agent/details").await
    }

    async fn get_json<T>(&self, path: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let session = self.session().await?;
        let endpoint = format!("{}{path}", session.base_api_url());

        let response = self
            .http_client
            .get(endpoint.as_str())
            .header(header::ACCEPT, "application/json")
            .header(SESSION_HEADER_V3, session.session_id())
            .header(SESSION_HEADER_V2, session.session_id())
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("failed to call {endpoint}: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Upstream(format!(
                "{endpoint} returned status {}: {body}",
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Upstream(format!("failed to parse response body from {endpoint}: {error}"))
        })
    }
}

#[async_trait]
impl SecurityLogSource for IicsSessionClient {
    async fn fetch_security_log(&self, limit: u32) -> AppResult<Vec<SecurityLogEntry>> {
        IicsSessionClient::fetch_security_log(self, limit).await
    }
}

#[async_trait]
impl AgentDirectory for IicsSessionClient {
    async fn list_agents(&self) -> AppResult<Vec<AgentSummary>> {
        IicsSessionClient::list_agents(self).await
    }

    async fn list_agent_details(&self) -> AppResult<Vec<AgentDetails>> {
        IicsSessionClient::list_agent_details(self).await
    }
}

#[cfg(test)]
mod tests;
