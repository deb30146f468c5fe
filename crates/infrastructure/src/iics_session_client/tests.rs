use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use saaswatch_application::{LoginEventRepository, LoginIngestService, LoginInsertOutcome};
use saaswatch_core::{AppError, AppResult};
use saaswatch_domain::LoginEvent;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{IicsCredentials, IicsSessionClient, login_url_for_region};

const LOGIN_PATH: &str = "/saas/public/core/v3/login";
const SECURITY_LOG_PATH: &str = "/saas/public/core/v3/securityLog";

fn credentials() -> IicsCredentials {
    match IicsCredentials::new("us", "svc-monitor", "s3cret") {
        Ok(credentials) => credentials,
        Err(error) => panic!("test credentials should be valid: {error}"),
    }
}

fn client_for(server: &MockServer) -> IicsSessionClient {
    IicsSessionClient::with_login_url(
        reqwest::Client::new(),
        credentials(),
        format!("{}{LOGIN_PATH}", server.uri()),
    )
}

async fn mount_login(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({"username": "svc-monitor", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{"name": "Integration Cloud", "baseApiUrl": format!("{}/saas", server.uri())}],
            "userInfo": {"sessionId": "session-123", "name": "svc-monitor"}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn lookup(values: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let values: HashMap<String, String> = values
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    move |name| values.get(name).cloned()
}

#[test]
fn login_url_is_region_specific() {
    assert_eq!(
        login_url_for_region("em"),
        "https://dm-em.informaticacloud.com/saas/public/core/v3/login"
    );
}

#[test]
fn credentials_require_username_and_password() {
    let missing_user = IicsCredentials::from_lookup(lookup(&[("IICS_PASSWORD", "pw")]));
    let missing_password = IicsCredentials::from_lookup(lookup(&[("IICS_USERNAME", "svc")]));
    let blank_password =
        IicsCredentials::from_lookup(lookup(&[("IICS_USERNAME", "svc"), ("IICS_PASSWORD", " ")]));

    assert!(matches!(missing_user, Err(AppError::Configuration(_))));
    assert!(matches!(missing_password, Err(AppError::Configuration(_))));
    assert!(matches!(blank_password, Err(AppError::Configuration(_))));
}

#[test]
fn credentials_resolve_region_with_fallbacks() {
    let defaulted =
        IicsCredentials::from_lookup(lookup(&[("IICS_USERNAME", "svc"), ("IICS_PASSWORD", "pw")]));
    let legacy = IicsCredentials::from_lookup(lookup(&[
        ("POD_REGION", "em"),
        ("IICS_USERNAME", "svc"),
        ("IICS_PASSWORD", "pw"),
    ]));
    let preferred = IicsCredentials::from_lookup(lookup(&[
        ("IICS_POD_REGION", "ap"),
        ("POD_REGION", "em"),
        ("IICS_USERNAME", "svc"),
        ("IICS_PASSWORD", "pw"),
    ]));

    assert_eq!(defaulted.ok().map(|c| c.region().to_owned()), Some("us".to_owned()));
    assert_eq!(legacy.ok().map(|c| c.region().to_owned()), Some("em".to_owned()));
    assert_eq!(preferred.ok().map(|c| c.region().to_owned()), Some("ap".to_owned()));
}

#[test]
fn credentials_debug_redacts_password() {
    let rendered = format!("{:?}", credentials());
    assert!(!rendered.contains("s3cret"));
    assert!(rendered.contains("svc-monitor"));
}

#[tokio::test]
async fn first_fetch_logs_in_once_and_reuses_session() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(SECURITY_LOG_PATH))
        .and(query_param("limit", "1000"))
        .and(header("INFA-SESSION-ID", "session-123"))
        .and(header("icSessionId", "session-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [
                {"actionEvent": "USER_LOGIN", "actor": "Bob", "entryTime": "2024-01-01T10:00:00.000Z"},
                {"actionEvent": "USER_LOGOUT", "actor": "Bob", "entryTime": "2024-01-01T11:00:00.000Z"}
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.is_authenticated());

    let first = client.fetch_security_log(1000).await;
    let second = client.fetch_security_log(1000).await;

    let Ok(first) = first else {
        panic!("first fetch should succeed");
    };
    assert_eq!(first.len(), 2);
    assert!(first[0].is_login());
    assert!(second.is_ok());
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn rejected_login_fails_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SECURITY_LOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entries": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.fetch_security_log(1000).await;

    assert!(matches!(result, Err(AppError::Authentication(_))));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn login_body_without_session_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{"baseApiUrl": format!("{}/saas", server.uri())}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.authenticate().await;

    assert!(matches!(result, Err(AppError::Authentication(_))));
}

#[tokio::test]
async fn login_body_without_products_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [],
            "userInfo": {"sessionId": "session-123"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.session().await;

    assert!(matches!(result, Err(AppError::Authentication(_))));
}

#[tokio::test]
async fn failed_fetch_is_an_upstream_error() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(SECURITY_LOG_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.fetch_security_log(1000).await;

    let Err(AppError::Upstream(message)) = result else {
        panic!("expected upstream error");
    };
    assert!(message.contains("securityLog"));
    assert!(message.contains("500"));
}

#[tokio::test]
async fn agent_details_use_v2_session_header() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/saas/api/v2/agent/details"))
        .and(header("icSessionId", "session-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "agent-east",
                "agentEngines": [
                    {"agentEngineStatus": {"appDisplayName": "Data Integration Server", "desiredStatus": "RUNNING", "status": "RUNNING"}}
                ]
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/saas/api/v2/agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "01", "name": "agent-east", "active": true, "readyToRun": true, "platform": "linux64"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let details = client.list_agent_details().await;
    let agents = client.list_agents().await;

    let Ok(details) = details else {
        panic!("agent details should load");
    };
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].agent_engines.len(), 1);
    let Ok(agents) = agents else {
        panic!("agents should load");
    };
    assert_eq!(agents[0].ready_to_run, Some(true));
}

#[derive(Default)]
struct RecordingLoginRepo {
    rows: Mutex<HashSet<LoginEvent>>,
}

#[async_trait]
impl LoginEventRepository for RecordingLoginRepo {
    async fn login_event_exists(&self, event: &LoginEvent) -> AppResult<bool> {
        let rows = self
            .rows
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock repo state: {error}")))?;
        Ok(rows.contains(event))
    }

    async fn insert_login_event(&self, event: &LoginEvent) -> AppResult<LoginInsertOutcome> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock repo state: {error}")))?;
        Ok(if rows.insert(event.clone()) {
            LoginInsertOutcome::Inserted
        } else {
            LoginInsertOutcome::Duplicate
        })
    }
}

#[tokio::test]
async fn entries_with_odd_field_types_do_not_sink_the_page() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(SECURITY_LOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [
                {"actionEvent": "USER_LOGIN", "actor": "Alice", "entryTime": "2024-01-01T10:00:00.000Z"},
                {"actionEvent": null, "actor": "bob", "entryTime": "2024-01-01T10:05:00.000Z"},
                {"actionEvent": "USER_LOGIN", "actor": "carol", "entryTime": 1704103200000_u64}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let entries = client.fetch_security_log(1000).await;
    let Ok(entries) = entries else {
        panic!("page with odd field types should still load");
    };
    assert_eq!(entries.len(), 3);

    let repo = Arc::new(RecordingLoginRepo::default());
    let service = LoginIngestService::new(repo.clone());
    let report = service.process_entries("prod", &entries).await;

    assert_eq!(report.recorded, 1);
    assert_eq!(report.ignored, 1);
    assert_eq!(report.skipped, 1);
    let users: Vec<String> = repo
        .rows
        .lock()
        .map(|rows| rows.iter().map(|row| row.user_id().to_owned()).collect())
        .unwrap_or_default();
    assert_eq!(users, vec!["alice".to_owned()]);
}
