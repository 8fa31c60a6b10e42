use anyhow::Result;

use super::ChatsBackend;
use crate::domain::models::AuthContext;
use crate::domain::models::ChatSession;
use crate::domain::models::ChatSessionCreate;

impl ChatsBackend {
    fn with_url(url: String) -> ChatsBackend {
        return ChatsBackend {
            url,
            auth: AuthContext::authenticated("abc".to_string(), Default::default()),
            timeout: "200".to_string(),
        };
    }
}

fn session_fixture(id: &str, titulo: &str, ultimo_acceso: &str) -> ChatSession {
    return ChatSession {
        id_session: id.to_string(),
        titulo: titulo.to_string(),
        caso_id: Some(7),
        system_prompt_id: Some(2),
        es_activo: true,
        fecha_creacion: "2026-01-05T09:00:00+00:00".to_string(),
        ultimo_acceso: ultimo_acceso.to_string(),
    };
}

#[tokio::test]
async fn it_fetches_a_session() -> Result<()> {
    let body = serde_json::to_string(&session_fixture(
        "sess-1",
        "Demanda laboral",
        "2026-01-06T10:00:00+00:00",
    ))?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/chats/sess-1")
        .match_header("Authorization", "Bearer abc")
        .with_status(200)
        .with_body(body)
        .create();

    let backend = ChatsBackend::with_url(server.url());
    let session = backend.get("sess-1").await?;

    mock.assert();
    assert_eq!(session.id_session, "sess-1");
    assert_eq!(session.titulo, "Demanda laboral");

    return Ok(());
}

#[tokio::test]
async fn it_lists_sessions_ordered_by_last_access() -> Result<()> {
    let body = serde_json::to_string(&vec![
        session_fixture("sess-2", "Apelación", "2026-01-07T12:00:00+00:00"),
        session_fixture("sess-1", "Demanda laboral", "2026-01-06T10:00:00+00:00"),
    ])?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/chats/caso/7")
        .with_status(200)
        .with_body(body)
        .create();

    let backend = ChatsBackend::with_url(server.url());
    let sessions = backend.list_for_caso(7).await?;

    mock.assert();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id_session, "sess-1");
    assert_eq!(sessions[1].id_session, "sess-2");

    return Ok(());
}

#[tokio::test]
async fn it_creates_a_session() -> Result<()> {
    let body = serde_json::to_string(&session_fixture(
        "sess-3",
        "Consulta nueva",
        "2026-01-08T08:00:00+00:00",
    ))?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chats/")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "titulo": "Consulta nueva",
            "caso_id": 7,
            "system_prompt_id": 2
        })))
        .with_status(200)
        .with_body(body)
        .create();

    let backend = ChatsBackend::with_url(server.url());
    let session = backend
        .create(&ChatSessionCreate {
            titulo: "Consulta nueva".to_string(),
            caso_id: 7,
            system_prompt_id: 2,
        })
        .await?;

    mock.assert();
    assert_eq!(session.id_session, "sess-3");

    return Ok(());
}

#[tokio::test]
async fn it_archives_a_session() -> Result<()> {
    let mut archived = session_fixture("sess-1", "Demanda laboral", "2026-01-06T10:00:00+00:00");
    archived.es_activo = false;
    let body = serde_json::to_string(&archived)?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("DELETE", "/chats/sess-1")
        .with_status(200)
        .with_body(body)
        .create();

    let backend = ChatsBackend::with_url(server.url());
    let session = backend.archive("sess-1").await?;

    mock.assert();
    assert!(!session.es_activo);
    assert!(session.describe().contains("(archivada)"));

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_unknown_sessions() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/chats/nope").with_status(404).create();

    let backend = ChatsBackend::with_url(server.url());
    let res = backend.get("nope").await;

    mock.assert();
    assert!(res.is_err());
}
