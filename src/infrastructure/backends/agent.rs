#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use futures::stream::TryStreamExt;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::sync::mpsc;

use super::sse::consume_sse;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AgentPrompt;
use crate::domain::models::AuthContext;
use crate::domain::models::ContextItem;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::PromptOverride;
use crate::domain::models::Role;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StreamRequest {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<PromptOverride>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RawEntryData {
    #[serde(default)]
    content: serde_json::Value,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    data: RawEntryData,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AgentStateBody {
    #[serde(default)]
    messages: Vec<RawEntry>,
    #[serde(default)]
    context: Vec<ContextItem>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AgentStateResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    state: AgentStateBody,
}

/// The upstream schema is loosely typed; anything that is not already a
/// string is kept as its JSON string form rather than rejected.
fn coerce_content(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => return "".to_string(),
        serde_json::Value::String(text) => return text.to_string(),
        other => return other.to_string(),
    }
}

/// Normalizes a raw agent state into the two-role transcript. Entries other
/// than `human`/`ai`/`assistant` (tool calls, system frames) are dropped.
/// Retrieval context is reported as a separate state key and always belongs
/// to the latest generation, so it is attached to the trailing message if and
/// only if that message is an assistant one.
fn parse_state(res: AgentStateResponse) -> Vec<Message> {
    let mut messages = res
        .state
        .messages
        .iter()
        .filter(|entry| {
            return ["human", "ai", "assistant"].contains(&entry.entry_type.as_str());
        })
        .map(|entry| {
            let role = if entry.entry_type == "human" {
                Role::User
            } else {
                Role::Assistant
            };

            return Message::new(role, &coerce_content(&entry.data.content));
        })
        .collect::<Vec<Message>>();

    if !res.state.context.is_empty() {
        if let Some(last) = messages.last_mut() {
            if last.role == Role::Assistant {
                last.set_context(res.state.context);
            }
        }
    }

    return messages;
}

pub struct AgentBackend {
    url: String,
    auth: AuthContext,
    timeout: String,
}

impl AgentBackend {
    pub fn from_config(auth: AuthContext) -> AgentBackend {
        return AgentBackend {
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

    async fn open_stream(
        &self,
        url: String,
        query: &[(&str, &str)],
        req: &StreamRequest,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let mut builder = self.authorize(reqwest::Client::new().post(url));
        if !query.is_empty() {
            builder = builder.query(query);
        }

        // No request timeout here: generations legitimately take a while and
        // the body is consumed incrementally.
        let res = builder.json(req).send().await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to open completion stream"
            );
            bail!("Failed to open completion stream");
        }

        let stream = res.bytes_stream().map_err(convert_err);
        return consume_sse(stream, tx).await;
    }

    /// Streams one turn against a persisted chat session, emitting tokens on
    /// `tx` as they arrive.
    pub async fn stream_session_message(
        &self,
        session_id: &str,
        prompt: &AgentPrompt,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let req = StreamRequest {
            content: prompt.text.to_string(),
            system_prompt: prompt.prompt_override.clone(),
        };

        return self
            .open_stream(
                format!("{url}/chat-agent/{session_id}/stream", url = self.url),
                &[],
                &req,
                tx,
            )
            .await;
    }

    /// Streams one turn on the general (no persisted session) thread.
    pub async fn stream_general_message(
        &self,
        thread_id: &str,
        prompt: &AgentPrompt,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let req = StreamRequest {
            content: prompt.text.to_string(),
            system_prompt: prompt.prompt_override.clone(),
        };

        return self
            .open_stream(
                format!("{url}/chat-agent/general/stream", url = self.url),
                &[("thread_id", thread_id)],
                &req,
                tx,
            )
            .await;
    }

    async fn fetch_state(&self, url: String, query: &[(&str, &str)]) -> Result<Vec<Message>> {
        let mut builder = self.authorize(reqwest::Client::new().get(url));
        if !query.is_empty() {
            builder = builder.query(query);
        }

        let res = builder
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to fetch agent state");
            bail!("Failed to fetch agent state");
        }

        let state = res.json::<AgentStateResponse>().await?;
        return Ok(parse_state(state));
    }

    /// Fetches the server-confirmed transcript for a chat session. The server
    /// checkpoint is the source of truth after a streamed turn; the streamed
    /// tokens are best-effort.
    pub async fn session_state(&self, session_id: &str) -> Result<Vec<Message>> {
        return self
            .fetch_state(
                format!("{url}/chat-agent/{session_id}/state", url = self.url),
                &[],
            )
            .await;
    }

    pub async fn general_state(&self, thread_id: &str) -> Result<Vec<Message>> {
        return self
            .fetch_state(
                format!("{url}/chat-agent/general/state", url = self.url),
                &[("thread_id", thread_id)],
            )
            .await;
    }
}
