use super::PromptOverride;

/// A user turn on its way to the agent backend.
pub struct AgentPrompt {
    pub text: String,
    pub prompt_override: Option<PromptOverride>,
}

impl AgentPrompt {
    pub fn new(text: String) -> AgentPrompt {
        return AgentPrompt {
            text,
            prompt_override: None,
        };
    }

    pub fn with_override(text: String, prompt_override: PromptOverride) -> AgentPrompt {
        return AgentPrompt {
            text,
            prompt_override: Some(prompt_override),
        };
    }
}
