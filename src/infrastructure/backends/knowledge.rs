#[cfg(test)]
#[path = "knowledge_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AuthContext;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SearchRequest {
    query: String,
    k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_filename: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub content: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ChunkResult {
    pub fn source_filename(&self) -> Option<&str> {
        return self
            .metadata
            .get("source_filename")
            .and_then(|val| return val.as_str());
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ChunkResult>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SourcesResponse {
    sources: Vec<String>,
}

pub struct KnowledgeBackend {
    url: String,
    auth: AuthContext,
    timeout: String,
}

impl KnowledgeBackend {
    pub fn from_config(auth: AuthContext) -> KnowledgeBackend {
        return KnowledgeBackend {
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

    pub async fn search(
        &self,
        query: &str,
        k: u32,
        source_filename: Option<String>,
    ) -> Result<SearchResponse> {
        let req = SearchRequest {
            query: query.to_string(),
            k,
            source_filename,
        };

        let res = self
            .authorize(
                reqwest::Client::new().post(format!("{url}/knowledge/search", url = self.url)),
            )
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Knowledge search failed");
            bail!("Knowledge search failed");
        }

        return Ok(res.json::<SearchResponse>().await?);
    }

    pub async fn sources(&self) -> Result<Vec<String>> {
        let res = self
            .authorize(
                reqwest::Client::new().get(format!("{url}/knowledge/sources", url = self.url)),
            )
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to list knowledge sources");
            bail!("Failed to list knowledge sources");
        }

        return Ok(res.json::<SourcesResponse>().await?.sources);
    }
}
