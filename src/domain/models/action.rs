use super::AgentPrompt;

pub enum Action {
    Abort(),
    ArchiveSession(),
    ListSessions(),
    SearchKnowledge(String),
    SendPrompt(AgentPrompt),
    SyncTranscript(),
}
