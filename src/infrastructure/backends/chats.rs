#[cfg(test)]
#[path = "chats_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use chrono::DateTime;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AuthContext;
use crate::domain::models::ChatSession;
use crate::domain::models::ChatSessionCreate;

pub struct ChatsBackend {
    url: String,
    auth: AuthContext,
    timeout: String,
}

impl ChatsBackend {
    pub fn from_config(auth: AuthContext) -> ChatsBackend {
        return ChatsBackend {
            url: Config::get(ConfigKey::ApiURL),
            auth,
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.auth.token {
            return builder.header("Authorization", format!("Bearer {token}"));
        }

        return builder;
    }

    fn timeout_ms(&self) -> Result<Duration> {
        return Ok(Duration::from_millis(self.timeout.parse::<u64>()?));
    }

    pub async fn get(&self, session_id: &str) -> Result<ChatSession> {
        let res = self
            .authorize(
                reqwest::Client::new()
                    .get(format!("{url}/chats/{session_id}", url = self.url)),
            )
            .timeout(self.timeout_ms()?)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to fetch chat session");
            bail!("Failed to fetch chat session");
        }

        return Ok(res.json::<ChatSession>().await?);
    }

    /// Sessions for a case, oldest access first.
    pub async fn list_for_caso(&self, caso_id: i64) -> Result<Vec<ChatSession>> {
        let res = self
            .authorize(
                reqwest::Client::new()
                    .get(format!("{url}/chats/caso/{caso_id}", url = self.url)),
            )
            .timeout(self.timeout_ms()?)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to list chat sessions");
            bail!("Failed to list chat sessions");
        }

        let mut sessions = res.json::<Vec<ChatSession>>().await?;
        sessions.sort_by_cached_key(|session| {
            return DateTime::parse_from_rfc3339(&session.ultimo_acceso)
                .map(|date| return date.timestamp())
                .unwrap_or(0);
        });

        return Ok(sessions);
    }

    pub async fn create(&self, data: &ChatSessionCreate) -> Result<ChatSession> {
        let res = self
            .authorize(reqwest::Client::new().post(format!("{url}/chats/", url = self.url)))
            .timeout(self.timeout_ms()?)
            .json(data)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to create chat session");
            bail!("Failed to create chat session");
        }

        return Ok(res.json::<ChatSession>().await?);
    }

    /// Archiving is a soft delete; the backend returns the archived session.
    pub async fn archive(&self, session_id: &str) -> Result<ChatSession> {
        let res = self
            .authorize(
                reqwest::Client::new()
                    .delete(format!("{url}/chats/{session_id}", url = self.url)),
            )
            .timeout(self.timeout_ms()?)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to archive chat session");
            bail!("Failed to archive chat session");
        }

        return Ok(res.json::<ChatSession>().await?);
    }
}
