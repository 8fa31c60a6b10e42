use anyhow::Result;

use super::ChunkResult;
use super::KnowledgeBackend;
use super::SearchResponse;
use super::SourcesResponse;
use crate::domain::models::AuthContext;

impl KnowledgeBackend {
    fn with_url(url: String) -> KnowledgeBackend {
        return KnowledgeBackend {
            url,
            auth: AuthContext::authenticated("abc".to_string(), Default::default()),
            timeout: "200".to_string(),
        };
    }
}

#[tokio::test]
async fn it_searches_the_knowledge_base() -> Result<()> {
    let body = serde_json::to_string(&SearchResponse {
        query: "plazo de apelación".to_string(),
        results: vec![ChunkResult {
            content: "El plazo de apelación es de diez días.".to_string(),
            score: 0.8732,
            metadata: serde_json::json!({ "source_filename": "cpc.pdf", "page_label": "41" }),
        }],
    })?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/knowledge/search")
        .match_header("Authorization", "Bearer abc")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "query": "plazo de apelación",
            "k": 5
        })))
        .with_status(200)
        .with_body(body)
        .create();

    let backend = KnowledgeBackend::with_url(server.url());
    let res = backend.search("plazo de apelación", 5, None).await?;

    mock.assert();
    assert_eq!(res.results.len(), 1);
    assert_eq!(res.results[0].source_filename(), Some("cpc.pdf"));

    return Ok(());
}

#[tokio::test]
async fn it_filters_search_by_source() -> Result<()> {
    let body = serde_json::to_string(&SearchResponse::default())?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/knowledge/search")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "query": "contrato",
            "k": 3,
            "source_filename": "codigo-civil.pdf"
        })))
        .with_status(200)
        .with_body(body)
        .create();

    let backend = KnowledgeBackend::with_url(server.url());
    backend
        .search("contrato", 3, Some("codigo-civil.pdf".to_string()))
        .await?;

    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_lists_sources() -> Result<()> {
    let body = serde_json::to_string(&SourcesResponse {
        sources: vec!["cpc.pdf".to_string(), "codigo-civil.pdf".to_string()],
    })?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/knowledge/sources")
        .with_status(200)
        .with_body(body)
        .create();

    let backend = KnowledgeBackend::with_url(server.url());
    let sources = backend.sources().await?;

    mock.assert();
    assert_eq!(sources, vec!["cpc.pdf".to_string(), "codigo-civil.pdf".to_string()]);

    return Ok(());
}

#[tokio::test]
async fn it_fails_search_on_server_errors() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/knowledge/search")
        .with_status(500)
        .create();

    let backend = KnowledgeBackend::with_url(server.url());
    let res = backend.search("contrato", 5, None).await;

    mock.assert();
    assert!(res.is_err());
}
