/// A raw SSE body the way the agent backend frames it: keep-alive comments,
/// `event:`/`id:` fields the protocol ignores, token payloads, a payload with
/// no recognized field, the `[DONE]` sentinel, and a token after it that must
/// never be emitted.
pub fn sse_fixture() -> &'static str {
    return r#": keep-alive

event: message
id: 7
data: {"token":"Hola, "}

data: {"token":"señor. "}

data: {"token":"¿En qué puedo ayudarte?"}

data: {"session_id":"abc-123"}

data: [DONE]

data: {"token":"tarde"}
"#;
}

/// Tokens `sse_fixture` is expected to produce, in order.
pub fn sse_fixture_tokens() -> Vec<String> {
    return vec![
        "Hola, ".to_string(),
        "señor. ".to_string(),
        "¿En qué puedo ayudarte?".to_string(),
    ];
}
