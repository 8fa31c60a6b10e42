use super::AppState;
use super::SEND_ERROR_FALLBACK;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Role;

#[test]
fn it_begins_send_with_optimistic_pair() {
    let mut state = AppState::new();
    state.begin_send("hola");

    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[0].role, Role::User);
    assert_eq!(state.messages[0].content, "hola");
    assert_eq!(state.messages[1].role, Role::Assistant);
    assert_eq!(state.messages[1].content, "");
    assert!(state.waiting_for_backend);
}

#[test]
fn it_appends_tokens_in_order() {
    let mut state = AppState::new();
    state.begin_send("hola");
    state.append_token("A");
    state.append_token("B");

    assert_eq!(state.messages.last().unwrap().content, "AB");
}

#[test]
fn it_streams_a_full_turn() {
    let mut state = AppState::new();
    state.begin_send("hola");
    for token in ["Hola", " ", "mundo"] {
        state.append_token(token);
    }

    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages.last().unwrap().content, "Hola mundo");
}

#[test]
fn it_drops_tokens_when_tail_is_not_assistant() {
    let mut state = AppState::new();
    state.add_message(Message::new(Role::User, "hola"));
    state.append_token("A");

    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].content, "hola");
}

#[test]
fn it_replaces_the_transcript() {
    let mut state = AppState::new();
    state.begin_send("hola");
    state.append_token("borrador");

    state.replace_all(vec![
        Message::new(Role::User, "hola"),
        Message::new(Role::Assistant, "Hola mundo"),
    ]);

    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[1].content, "Hola mundo");
    assert!(!state.waiting_for_backend);
}

#[test]
fn it_marks_an_empty_placeholder_as_error() {
    let mut state = AppState::new();
    state.begin_send("hola");
    state.mark_last_as_error();

    assert_eq!(state.messages.len(), 2);
    let last = state.messages.last().unwrap();
    assert_eq!(last.content, SEND_ERROR_FALLBACK);
    assert_eq!(last.message_type(), MessageType::Error);
    assert!(!state.waiting_for_backend);
}

#[test]
fn it_keeps_partial_content_and_appends_the_error() {
    let mut state = AppState::new();
    state.begin_send("hola");
    state.append_token("Hi");
    state.mark_last_as_error();

    assert_eq!(state.messages.len(), 3);
    assert_eq!(state.messages[1].content, "Hi");
    assert_eq!(state.messages[1].message_type(), MessageType::Normal);
    assert_eq!(state.messages[2].content, SEND_ERROR_FALLBACK);
    assert_eq!(state.messages[2].message_type(), MessageType::Error);
}
