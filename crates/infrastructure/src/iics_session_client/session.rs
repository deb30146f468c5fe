use saaswatch_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequest<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginResponse {
    #[serde(default)]
    products: Vec<LoginProduct>,
    #[serde(default)]
    user_info: Option<LoginUserInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginProduct {
    #[serde(default)]
    base_api_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginUserInfo {
    #[serde(default)]
    session_id: Option<String>,
}

/// Authenticated context returned by the vendor login endpoint.
///
/// Only constructible from a complete login response, so the base URL and
/// session id are always set together.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    base_api_url: String,
    session_id: String,
}

impl Session {
    pub(super) fn from_login_response(response: LoginResponse) -> AppResult<Self> {
        let base_api_url = response
            .products
            .into_iter()
            .next()
            .and_then(|product| product.base_api_url)
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                AppError::Authentication(
                    "login response is missing products[0].baseApiUrl".to_owned(),
                )
            })?;
        let session_id = response
            .user_info
            .and_then(|user_info| user_info.session_id)
            .filter(|session_id| !session_id.trim().is_empty())
            .ok_or_else(|| {
                AppError::Authentication("login response is missing userInfo.sessionId".to_owned())
            })?;

        Ok(Self {
            base_api_url,
            session_id,
        })
    }

    /// Returns the API prefix for authenticated calls.
    #[must_use]
    pub fn base_api_url(&self) -> &str {
        self.base_api_url.as_str()
    }

    /// Returns the session token sent with authenticated calls.
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.session_id.as_str()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Session")
            .field("base_api_url", &self.base_api_url)
            .field("session_id", &"<redacted>")
            .finish()
    }
}
