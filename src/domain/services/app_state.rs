#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Role;

/// The only error text ever shown inside the conversation. Real causes go to
/// the log.
pub const SEND_ERROR_FALLBACK: &str = "Error al procesar tu mensaje. Intenta nuevamente.";

pub struct AppState {
    pub messages: Vec<Message>,
    pub waiting_for_backend: bool,
}

impl AppState {
    pub fn new() -> AppState {
        return AppState {
            messages: vec![],
            waiting_for_backend: false,
        };
    }

    /// Optimistic update for a send: the user's message plus an empty
    /// assistant placeholder. The placeholder stays the list tail for the
    /// whole stream, and `waiting_for_backend` gates any further send until
    /// the cycle terminates.
    pub fn begin_send(&mut self, text: &str) {
        self.messages.push(Message::new(Role::User, text));
        self.messages.push(Message::new(Role::Assistant, ""));
        self.waiting_for_backend = true;
    }

    /// Appends a streamed token to the in-flight assistant message. Tokens
    /// arriving when the tail is not an assistant message are dropped; a new
    /// message is never created here.
    pub fn append_token(&mut self, token: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == Role::Assistant {
                last.append(token);
            }
        }
    }

    /// Replaces the transcript with the server-confirmed state, discarding
    /// all speculative content.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.waiting_for_backend = false;
    }

    /// Failure path for a send cycle. An empty placeholder becomes the
    /// fallback bubble; partial streamed content is kept as-is and the
    /// fallback is appended after it.
    pub fn mark_last_as_error(&mut self) {
        self.waiting_for_backend = false;

        if let Some(last) = self.messages.last_mut() {
            if last.role == Role::Assistant && last.content.is_empty() {
                *last =
                    Message::new_with_type(Role::Assistant, MessageType::Error, SEND_ERROR_FALLBACK);
                return;
            }
        }

        self.messages.push(Message::new_with_type(
            Role::Assistant,
            MessageType::Error,
            SEND_ERROR_FALLBACK,
        ));
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}
