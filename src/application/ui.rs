use std::io::Write;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::AgentPrompt;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::SlashCommand;
use crate::domain::services::actions::help_text;
use crate::domain::services::AppState;
use crate::domain::services::SEND_ERROR_FALLBACK;

const ASSISTANT_NAME: &str = "Kantuta AI";

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

fn print_prompt() {
    print!("› ");
    flush_stdout();
}

fn print_citations(message: &Message) {
    if let Some(context) = &message.context {
        for (idx, item) in context.iter().enumerate() {
            println!(
                "  [{n}] {source}, pág. {page} (relevancia {score:.4})",
                n = idx + 1,
                source = item.source_filename().unwrap_or("Desconocido"),
                page = item.page_label().unwrap_or_else(|| return "?".to_string()),
                score = item.score,
            );
        }
    }
}

fn print_message(message: &Message) {
    let author = match message.role {
        Role::User => Config::get(ConfigKey::Username),
        Role::Assistant => ASSISTANT_NAME.to_string(),
    };

    println!("{author}: {content}", content = message.content);
    print_citations(message);
}

fn print_transcript(state: &AppState) {
    if state.messages.is_empty() {
        println!("Inicia la conversación. Kantuta AI puede cometer errores, verifica la información importante.");
        return;
    }

    for message in &state.messages {
        print_message(message);
    }
}

fn handle_event(state: &mut AppState, event: Event) {
    match event {
        Event::StreamToken(token) => {
            state.append_token(&token);
            print!("{token}");
            flush_stdout();
        }
        Event::TranscriptReplaced(messages) => {
            let initial = !state.waiting_for_backend;
            state.replace_all(messages);

            if initial {
                print_transcript(state);
            } else {
                // The streamed text is already on screen; just close the line
                // and surface any citations the checkpoint attached.
                println!();
                if let Some(last) = state.messages.last() {
                    print_citations(last);
                }
            }
            print_prompt();
        }
        Event::StreamErrored() => {
            state.mark_last_as_error();
            println!();
            println!("{ASSISTANT_NAME}: {SEND_ERROR_FALLBACK}");
            print_prompt();
        }
        Event::NoticeMessage(message) => {
            print_message(&message);
            state.add_message(message);
            print_prompt();
        }
    }
}

/// Returns true when the loop should exit.
fn handle_input(
    state: &mut AppState,
    tx: &mpsc::UnboundedSender<Action>,
    line: &str,
) -> Result<bool> {
    let text = line.trim();
    if text.is_empty() {
        print_prompt();
        return Ok(false);
    }

    if state.waiting_for_backend {
        println!("Espera a que termine la respuesta actual.");
        return Ok(false);
    }

    if let Some(command) = SlashCommand::parse(text) {
        if command.is_quit() {
            return Ok(true);
        }
        if command.is_help() {
            println!("{}", help_text());
            print_prompt();
            return Ok(false);
        }
        if command.is_sessions() {
            tx.send(Action::ListSessions())?;
            return Ok(false);
        }
        if command.is_archive() {
            tx.send(Action::ArchiveSession())?;
            return Ok(false);
        }
        if command.is_search() {
            if command.args.is_empty() {
                println!("Debes indicar una consulta. Ejemplo: /search plazo de apelación");
                print_prompt();
                return Ok(false);
            }
            tx.send(Action::SearchKnowledge(command.args.join(" ")))?;
            return Ok(false);
        }
    }

    state.begin_send(text);
    tx.send(Action::SendPrompt(AgentPrompt::new(text.to_string())))?;
    print!("{ASSISTANT_NAME}: ");
    flush_stdout();

    return Ok(false);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut state = AppState::new();
    tx.send(Action::SyncTranscript())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = rx.recv() => {
                if let Some(event) = event {
                    handle_event(&mut state, event);
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if handle_input(&mut state, &tx, &line)? {
                            break;
                        }
                    }
                    // stdin closed.
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if state.waiting_for_backend {
                    tx.send(Action::Abort())?;
                    state.waiting_for_backend = false;
                    println!();
                    println!("Generación interrumpida.");
                    print_prompt();
                } else {
                    break;
                }
            }
        }
    }

    return Ok(());
}
