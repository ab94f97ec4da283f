//! Career assistant chat. History lives in the talent session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::{GenerationOptions, LlmClient};
use crate::recommendations::prompts::career_prompt;

/// Messages of recent history sent as context.
pub const CONTEXT_WINDOW: usize = 5;

const CHAT_OPTIONS: GenerationOptions = GenerationOptions {
    temperature: 0.8,
    max_output_tokens: 1500,
    json_output: false,
};

const WELCOME: &str = "👋 Halo! Saya **Career Assistant AI**.\n\n\
Saya akan membantu Anda menemukan jalur karier yang tepat! Ceritakan tentang:\n\n\
✅ Pengalaman kerja Anda\n✅ Skill yang Anda kuasai\n✅ Minat karier Anda\n\nYuk mulai! 🚀";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

pub fn welcome_message() -> ChatMessage {
    ChatMessage::new(ChatRole::Ai, WELCOME)
}

/// Renders the tail of the history as `User: ...` / `AI: ...` lines.
pub fn render_context(history: &[ChatMessage]) -> String {
    let start = history.len().saturating_sub(CONTEXT_WINDOW);
    history[start..]
        .iter()
        .map(|m| {
            let speaker = match m.role {
                ChatRole::User => "User",
                ChatRole::Ai => "AI",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asks the LLM for a reply. `history` already contains `message` as its
/// last entry.
pub async fn career_reply(
    llm: &LlmClient,
    message: &str,
    history: &[ChatMessage],
) -> Result<String, AppError> {
    let prompt = career_prompt(&render_context(history), message);
    llm.generate(&prompt, CHAT_OPTIONS)
        .await
        .map_err(|e| AppError::Llm(format!("Career assistant failed: {e}")))
}
