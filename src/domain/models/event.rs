use super::Message;

pub enum Event {
    NoticeMessage(Message),
    StreamErrored(),
    StreamToken(String),
    TranscriptReplaced(Vec<Message>),
}
