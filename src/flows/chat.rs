//! Chat flow: free-text message plus optional context in, response and
//! optional suggestions out.

use serde::Deserialize;

use crate::llm::LlmClient;
use crate::schema::{chat_output_shape, validate};

use super::{extract_json_block, GenerationError};

pub const CHAT_SYSTEM_PROMPT: &str = "You are a personal health assistant. Your role is to answer user questions and provide relevant suggestions based on their tracked data and current context.";

/// Input to one chat turn. Absent context fields render as empty text.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    pub message: String,
    pub health_stats: Option<String>,
    pub tasks: Option<String>,
    pub chat_history: Option<String>,
}

impl ChatInput {
    pub fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..Default::default()
        }
    }
}

/// The chat flow's validated output. Suggestions, when present, become
/// quick-replies the view layer re-submits as new messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

/// Render the chat prompt. Substitution is a pure string operation — the
/// message and context text appear verbatim, never reinterpreted.
pub fn build_chat_prompt(input: &ChatInput) -> String {
    format!(
        r#"Here is the user's message: {message}
Here are the user's health stats: {health_stats}
Here are the user's tasks: {tasks}
Here is the user's chat history: {chat_history}

Based on the above information, provide a helpful and informative response. Include relevant suggestions, such as hydration tips or exercise recommendations, when appropriate.
Format your response as a JSON object with a "response" field containing your answer and a "suggestions" field containing an array of suggestions.
If no suggestions are available, omit the "suggestions" field."#,
        message = input.message,
        health_stats = input.health_stats.as_deref().unwrap_or(""),
        tasks = input.tasks.as_deref().unwrap_or(""),
        chat_history = input.chat_history.as_deref().unwrap_or(""),
    )
}

/// Run the chat flow. Errors propagate; no retry, no partial results.
pub fn run(llm: &dyn LlmClient, input: &ChatInput) -> Result<ChatReply, GenerationError> {
    let prompt = build_chat_prompt(input);
    let response = llm.generate(&prompt, CHAT_SYSTEM_PROMPT)?;

    let raw = extract_json_block(&response)?;
    let validated = validate(&chat_output_shape(), &raw)?;

    let reply: ChatReply = serde_json::from_value(validated)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    tracing::debug!(
        response_len = reply.response.len(),
        suggestions = reply.suggestions.as_ref().map(Vec::len).unwrap_or(0),
        "Chat flow complete"
    );
    Ok(reply)
}
