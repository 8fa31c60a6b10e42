use super::SlashCommand;

#[test]
fn it_parses_quit() {
    for text in ["/q", "/quit", "/exit"] {
        let cmd = SlashCommand::parse(text).unwrap();
        assert!(cmd.is_quit());
    }
}

#[test]
fn it_parses_help() {
    let cmd = SlashCommand::parse("/help").unwrap();
    assert!(cmd.is_help());
    assert!(!cmd.is_quit());
}

#[test]
fn it_parses_sessions() {
    let cmd = SlashCommand::parse("/sessions").unwrap();
    assert!(cmd.is_sessions());
}

#[test]
fn it_parses_archive() {
    let cmd = SlashCommand::parse("/archive").unwrap();
    assert!(cmd.is_archive());
}

#[test]
fn it_parses_search_with_args() {
    let cmd = SlashCommand::parse("/buscar plazo de apelación").unwrap();
    assert!(cmd.is_search());
    assert_eq!(cmd.args, vec!["plazo", "de", "apelación"]);
}

#[test]
fn it_rejects_plain_text() {
    assert!(SlashCommand::parse("hola /help").is_none());
    assert!(SlashCommand::parse("/unknown").is_none());
}
