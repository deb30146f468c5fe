//! saaswatch login sync worker.
//!
//! Polls the vendor security log and records user logins in
//! `environment_usage_events`, once or on a fixed interval.

#![forbid(unsafe_code)]

mod login_sync_config;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use saaswatch_application::{LoginIngestService, LoginSyncJob};
use saaswatch_core::{AppError, AppResult};
use saaswatch_infrastructure::{IicsSessionClient, PostgresLoginEventRepository};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use login_sync_config::{LoginSyncConfig, RunMode};

const DATABASE_MAX_CONNECTIONS: u32 = 10;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "saaswatch-login-sync starting");

    let config = LoginSyncConfig::load()?;
    let pool = connect_pool(config.database_url.as_str())?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    info!(
        environment = %config.environment_name.as_str(),
        region = %config.credentials.region(),
        username = %config.credentials.username(),
        run_mode = ?config.run_mode,
        sync_interval_secs = config.sync_interval.as_secs(),
        security_log_limit = config.security_log_limit,
        "login sync configured"
    );

    match config.run_mode {
        RunMode::Once => {
            let job = build_job(&config, pool, http_client);
            tokio::select! {
                result = job.run_once() => {
                    if let Err(error) = &result {
                        error!(kind = error.kind(), error = %error, "login sync failed");
                    }
                    result.map(|_| ())
                }
                () = shutdown_signal() => {
                    info!("shutdown signal received, abandoning login sync");
                    Ok(())
                }
            }
        }
        RunMode::Recurring => {
            tokio::select! {
                () = run_recurring(&config, pool, http_client) => {}
                () = shutdown_signal() => {
                    info!("shutdown signal received, stopping login sync");
                }
            }
            Ok(())
        }
    }
}

fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(DATABASE_MAX_CONNECTIONS)
        .connect_lazy(database_url)
        .map_err(|error| AppError::Configuration(format!("invalid DATABASE_URL: {error}")))
}

fn build_job(config: &LoginSyncConfig, pool: PgPool, http_client: reqwest::Client) -> LoginSyncJob {
    let client = Arc::new(IicsSessionClient::new(http_client, config.credentials.clone()));
    let repository = Arc::new(PostgresLoginEventRepository::new(pool));

    LoginSyncJob::new(
        client,
        LoginIngestService::new(repository),
        config.environment_name.clone(),
        config.security_log_limit,
    )
}

/// Runs a tick immediately and then once per interval.
///
/// Every tick gets its own client, so an expired vendor session never
/// outlives the tick that observed it.
async fn run_recurring(config: &LoginSyncConfig, pool: PgPool, http_client: reqwest::Client) {
    let mut ticker = tokio::time::interval(config.sync_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let job = build_job(config, pool.clone(), http_client.clone());
        if let Err(error) = job.run_once().await {
            warn!(
                kind = error.kind(),
                error = %error,
                next_tick_secs = config.sync_interval.as_secs(),
                "login sync tick failed"
            );
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `LOG_LEVEL`; `LOG_FORMAT=full` switches from the
/// compact line format.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            env::var("LOG_LEVEL")
                .ok()
                .filter(|level| !level.trim().is_empty())
                .and_then(|level| EnvFilter::try_new(level.trim().to_lowercase()).ok())
        })
        .unwrap_or_else(|| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    match env::var("LOG_FORMAT").as_deref() {
        Ok("full") => builder.init(),
        _ => builder.compact().init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
