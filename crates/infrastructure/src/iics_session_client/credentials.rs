use std::fmt::{Debug, Formatter};

use saaswatch_core::{AppError, AppResult, NonEmptyString};

const DEFAULT_POD_REGION: &str = "us";

/// Login credentials and pod region for one vendor organization.
#[derive(Clone)]
pub struct IicsCredentials {
    region: NonEmptyString,
    username: NonEmptyString,
    password: NonEmptyString,
}

impl IicsCredentials {
    /// Creates credentials, rejecting empty values.
    pub fn new(
        region: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            region: required("pod region", region.into())?,
            username: required("IICS_USERNAME", username.into())?,
            password: required("IICS_PASSWORD", password.into())?,
        })
    }

    /// Reads credentials from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through a variable lookup function.
    ///
    /// The region comes from `IICS_POD_REGION`, then `POD_REGION`, then
    /// defaults to `us`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let region = lookup("IICS_POD_REGION")
            .or_else(|| lookup("POD_REGION"))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_POD_REGION.to_owned());
        let username = lookup("IICS_USERNAME").ok_or_else(|| {
            AppError::Configuration(
                "You must set the environment variable IICS_USERNAME".to_owned(),
            )
        })?;
        let password = lookup("IICS_PASSWORD").ok_or_else(|| {
            AppError::Configuration(
                "You must set the environment variable IICS_PASSWORD".to_owned(),
            )
        })?;

        Self::new(region, username, password)
    }

    /// Returns the pod region, e.g. `us` or `em`.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_str()
    }

    /// Returns the login user name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub(super) fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl Debug for IicsCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("IicsCredentials")
            .field("region", &self.region.as_str())
            .field("username", &self.username.as_str())
            .field("password", &"<redacted>")
            .finish()
    }
}

fn required(name: &str, value: String) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value.trim())
        .map_err(|_| AppError::Configuration(format!("{name} must not be empty")))
}
