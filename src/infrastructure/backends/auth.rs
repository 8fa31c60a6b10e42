#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AuthContext;
use crate::domain::models::UserProfile;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    token_type: String,
    user_data: UserProfile,
}

pub struct AuthBackend {
    url: String,
    timeout: String,
}

impl AuthBackend {
    pub fn from_config() -> AuthBackend {
        return AuthBackend {
            url: Config::get(ConfigKey::ApiURL),
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }

    /// Exchanges credentials for a bearer token. The endpoint takes a
    /// form-encoded body, not JSON.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthContext> {
        let res = reqwest::Client::new()
            .post(format!("{url}/token", url = self.url))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Login failed");
            bail!("Login failed, check your credentials");
        }

        let login = res.json::<LoginResponse>().await?;
        return Ok(AuthContext::authenticated(login.access_token, login.user_data));
    }
}
