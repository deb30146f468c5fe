use std::env;
use std::time::Duration;

use saaswatch_application::DEFAULT_SECURITY_LOG_LIMIT;
use saaswatch_core::{AppError, AppResult, NonEmptyString};
use saaswatch_infrastructure::IicsCredentials;

const DEFAULT_SYNC_INTERVAL_HOURS: u64 = 12;
const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Whether the worker runs a single tick or keeps polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Once,
    Recurring,
}

#[derive(Clone)]
pub struct LoginSyncConfig {
    pub database_url: String,
    pub environment_name: NonEmptyString,
    pub credentials: IicsCredentials,
    pub sync_interval: Duration,
    pub security_log_limit: u32,
    pub run_mode: RunMode,
}

impl LoginSyncConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let credentials = IicsCredentials::from_lookup(&lookup)?;
        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("DB"))
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("DATABASE_URL is required".to_owned()))?;
        let environment_name = lookup("ENVIRONMENT_NAME")
            .and_then(|value| NonEmptyString::new(value.trim()).ok())
            .ok_or_else(|| AppError::Configuration("ENVIRONMENT_NAME is required".to_owned()))?;

        let sync_interval_hours =
            parse_positive(&lookup, "SYNC_INTERVAL_HOURS", DEFAULT_SYNC_INTERVAL_HOURS)?;
        let sync_interval = sync_interval_hours
            .checked_mul(SECONDS_PER_HOUR)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "SYNC_INTERVAL_HOURS value '{sync_interval_hours}' is too large"
                ))
            })?;
        let security_log_limit = u32::try_from(parse_positive(
            &lookup,
            "SECURITY_LOG_LIMIT",
            u64::from(DEFAULT_SECURITY_LOG_LIMIT),
        )?)
        .map_err(|error| {
            AppError::Configuration(format!("invalid SECURITY_LOG_LIMIT value: {error}"))
        })?;

        // Presence alone selects one-shot mode, whatever the value.
        let run_mode = if lookup("RUN_AND_EXIT").is_some() {
            RunMode::Once
        } else {
            RunMode::Recurring
        };

        Ok(Self {
            database_url,
            environment_name,
            credentials,
            sync_interval,
            security_log_limit,
            run_mode,
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    let parsed = value.trim().parse::<u64>().map_err(|error| {
        AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
    })?;
    if parsed == 0 {
        return Err(AppError::Configuration(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(parsed)
}
