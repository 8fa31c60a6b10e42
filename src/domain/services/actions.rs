use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::AgentPrompt;
use crate::domain::models::AuthContext;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Role;
use crate::infrastructure::backends::AgentBackend;
use crate::infrastructure::backends::ChatsBackend;
use crate::infrastructure::backends::KnowledgeBackend;

pub fn help_text() -> String {
    let text = r#"
COMANDOS:
- /sessions (/s) - Lista las sesiones de chat del caso configurado.
- /archive - Archiva la sesión de chat actual.
- /search (/buscar) [CONSULTA] - Busca en la base de conocimiento.
- /help (/h) - Muestra esta ayuda.
- /quit /exit (/q) - Salir de Kantuta.

ATAJOS:
- CTRL+C - Interrumpe la respuesta en curso, o sale si no hay ninguna.
        "#;

    return text.trim().to_string();
}

fn notice(tx: &mpsc::UnboundedSender<Event>, text: &str) -> Result<()> {
    tx.send(Event::NoticeMessage(Message::new(Role::Assistant, text)))?;
    return Ok(());
}

fn notice_error(tx: &mpsc::UnboundedSender<Event>, text: &str) -> Result<()> {
    tx.send(Event::NoticeMessage(Message::new_with_type(
        Role::Assistant,
        MessageType::Error,
        text,
    )))?;
    return Ok(());
}

fn worker_error(err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    tracing::error!(error = ?err, "backend request failed");
    return notice_error(tx, "No se pudo completar la operación. Intenta nuevamente.");
}

/// Streams the prompt against the configured session, or against the
/// per-run general thread when no session is set.
async fn stream_prompt(
    backend: &AgentBackend,
    prompt: &AgentPrompt,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let session_id = Config::get(ConfigKey::SessionID);
    if !session_id.is_empty() {
        return backend.stream_session_message(&session_id, prompt, tx).await;
    }

    return backend
        .stream_general_message(&Config::get(ConfigKey::ThreadID), prompt, tx)
        .await;
}

async fn reconcile(backend: &AgentBackend) -> Result<Vec<Message>> {
    let session_id = Config::get(ConfigKey::SessionID);
    if !session_id.is_empty() {
        return backend.session_state(&session_id).await;
    }

    return backend.general_state(&Config::get(ConfigKey::ThreadID)).await;
}

async fn list_sessions(auth: &AuthContext, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    let caso_id = Config::get(ConfigKey::CasoID);
    if caso_id.is_empty() {
        return notice_error(tx, "Configura caso-id para listar las sesiones del caso.");
    }

    let mut sessions = ChatsBackend::from_config(auth.clone())
        .list_for_caso(caso_id.parse::<i64>()?)
        .await?;
    sessions.reverse();

    if sessions.is_empty() {
        return notice(tx, "No hay sesiones para este caso todavía.");
    }

    let formatted = sessions
        .iter()
        .map(|session| {
            return session.describe();
        })
        .collect::<Vec<String>>();

    return notice(tx, formatted.join("\n").as_str());
}

async fn archive_session(auth: &AuthContext, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    let session_id = Config::get(ConfigKey::SessionID);
    if session_id.is_empty() {
        return notice_error(
            tx,
            "Solo se pueden archivar sesiones persistentes. Configura session-id.",
        );
    }

    let session = ChatsBackend::from_config(auth.clone())
        .archive(&session_id)
        .await?;

    return notice(tx, &format!("Sesión {titulo} archivada.", titulo = session.titulo));
}

async fn search_knowledge(
    auth: &AuthContext,
    tx: &mpsc::UnboundedSender<Event>,
    query: &str,
) -> Result<()> {
    let res = KnowledgeBackend::from_config(auth.clone())
        .search(query, 5, None)
        .await?;

    if res.results.is_empty() {
        return notice(tx, "Sin resultados para esa consulta.");
    }

    let formatted = res
        .results
        .iter()
        .map(|chunk| {
            let mut excerpt = chunk
                .content
                .split('\n')
                .next()
                .unwrap_or("")
                .chars()
                .take(120)
                .collect::<String>();
            if excerpt.len() < chunk.content.len() {
                excerpt = format!("{excerpt}...");
            }

            return format!(
                "- ({score:.4}) {source}: {excerpt}",
                score = chunk.score,
                source = chunk.source_filename().unwrap_or("Desconocido"),
            );
        })
        .collect::<Vec<String>>();

    return notice(tx, formatted.join("\n").as_str());
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        auth: AuthContext,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        // Lazy default.
        let mut worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        loop {
            let event = rx.recv().await;
            if event.is_none() {
                continue;
            }

            let worker_tx = tx.clone();
            match event.unwrap() {
                Action::Abort() => {
                    worker.abort();
                }
                Action::SendPrompt(prompt) => {
                    // The transcript tolerates a single in-flight cycle; a
                    // stale worker must not outlive the new one.
                    worker.abort();

                    let worker_auth = auth.clone();
                    worker = tokio::spawn(async move {
                        let backend = AgentBackend::from_config(worker_auth);

                        if let Err(err) = stream_prompt(&backend, &prompt, &worker_tx).await {
                            tracing::error!(error = ?err, "completion stream failed");
                            worker_tx.send(Event::StreamErrored())?;
                            return Ok(());
                        }

                        match reconcile(&backend).await {
                            Ok(messages) => {
                                worker_tx.send(Event::TranscriptReplaced(messages))?;
                            }
                            Err(err) => {
                                // The optimistic transcript is the only record
                                // of this turn now; keep it.
                                tracing::warn!(error = ?err, "state reconciliation failed after streaming");
                                worker_tx.send(Event::StreamErrored())?;
                            }
                        }

                        return Ok(());
                    });
                }
                Action::SyncTranscript() => {
                    worker.abort();

                    let worker_auth = auth.clone();
                    worker = tokio::spawn(async move {
                        let backend = AgentBackend::from_config(worker_auth);
                        match reconcile(&backend).await {
                            Ok(messages) => {
                                worker_tx.send(Event::TranscriptReplaced(messages))?;
                            }
                            Err(err) => {
                                tracing::warn!(error = ?err, "transcript load failed");
                                worker_tx.send(Event::NoticeMessage(Message::new_with_type(
                                    Role::Assistant,
                                    MessageType::Error,
                                    "Error al cargar el historial. Verifica tu conexión.",
                                )))?;
                            }
                        }

                        return Ok(());
                    });
                }
                Action::ListSessions() => {
                    if let Err(err) = list_sessions(&auth, &tx).await {
                        worker_error(err, &tx)?;
                    }
                }
                Action::ArchiveSession() => {
                    if let Err(err) = archive_session(&auth, &tx).await {
                        worker_error(err, &tx)?;
                    }
                }
                Action::SearchKnowledge(query) => {
                    if let Err(err) = search_knowledge(&auth, &tx, &query).await {
                        worker_error(err, &tx)?;
                    }
                }
            }
        }
    }
}
