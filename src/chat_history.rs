//! Chat turns: context assembly, the send round-trip, and live views.
//!
//! A turn is stored in two steps, the way the deployed app wrote it: the
//! prompt is appended with an empty response before the model call, then
//! the same document is updated with the real response. A failed call
//! leaves the prompt behind with its response still empty.

use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::flows::chat::{self, ChatInput, ChatReply};
use crate::flows::GenerationError;
use crate::llm::LlmClient;
use crate::models::enums::Sender;
use crate::models::{ChatMessage, ChatTurn};
use crate::session::UserContext;
use crate::store::{paths, Document, DocumentStore, StoreError, Subscription};

const ORDER_KEY: &str = "timestamp";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ═══════════════════════════════════════════
// Reading
// ═══════════════════════════════════════════

/// All stored turns, oldest first. Keys are the generated document ids.
pub fn list_turns(
    store: &dyn DocumentStore,
    user: &UserContext,
) -> Result<Vec<(String, ChatTurn)>, StoreError> {
    let docs = store.list_collection(&paths::chat_history(&user.uid), ORDER_KEY)?;
    docs.into_iter()
        .map(|doc| Ok((doc.key, serde_json::from_value(doc.value)?)))
        .collect()
}

/// True when the user has no stored turns yet; the view layer shows its
/// canned welcome message in that case.
pub fn is_empty(store: &dyn DocumentStore, user: &UserContext) -> Result<bool, StoreError> {
    Ok(store
        .list_collection(&paths::chat_history(&user.uid), ORDER_KEY)?
        .is_empty())
}

/// Render a snapshot of turn documents into display messages. Each turn
/// expands to a user message and, once the response has landed, an
/// assistant message.
pub fn render_messages(docs: &[Document]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(docs.len() * 2);
    for doc in docs {
        let turn: ChatTurn = match serde_json::from_value(doc.value.clone()) {
            Ok(turn) => turn,
            Err(e) => {
                tracing::warn!(key = %doc.key, error = %e, "Skipping malformed chat turn");
                continue;
            }
        };
        messages.push(ChatMessage {
            id: format!("{}:user", doc.key),
            sender: Sender::User,
            content: turn.prompt,
            suggestions: None,
        });
        if !turn.response.is_empty() {
            messages.push(ChatMessage {
                id: format!("{}:assistant", doc.key),
                sender: Sender::Assistant,
                content: turn.response,
                suggestions: None,
            });
        }
    }
    messages
}

/// The full conversation as display messages, oldest first.
pub fn messages(
    store: &dyn DocumentStore,
    user: &UserContext,
) -> Result<Vec<ChatMessage>, StoreError> {
    let docs = store.list_collection(&paths::chat_history(&user.uid), ORDER_KEY)?;
    Ok(render_messages(&docs))
}

/// Live view of the conversation. The callback fires with the rendered
/// messages immediately and after every stored turn changes.
pub fn subscribe(
    store: &dyn DocumentStore,
    user: &UserContext,
    callback: Box<dyn Fn(Vec<ChatMessage>) + Send>,
) -> Result<Subscription, StoreError> {
    store.stream_collection(
        &paths::chat_history(&user.uid),
        ORDER_KEY,
        Box::new(move |docs| callback(render_messages(docs))),
    )
}

// ═══════════════════════════════════════════
// Sending
// ═══════════════════════════════════════════

/// The conversation as flat context text, one `sender: content` line per
/// message, oldest first. This is what the chat prompt template receives.
pub fn history_text(store: &dyn DocumentStore, user: &UserContext) -> Result<String, StoreError> {
    let lines: Vec<String> = messages(store, user)?
        .into_iter()
        .map(|m| format!("{}: {}", m.sender.as_str(), m.content))
        .collect();
    Ok(lines.join("\n"))
}

/// Send one message: persist the prompt, call the model with the full
/// context, then fill in the response.
pub fn send_message(
    store: &dyn DocumentStore,
    llm: &dyn LlmClient,
    user: &UserContext,
    message: &str,
    health_stats: Option<String>,
    tasks: Option<String>,
) -> Result<ChatReply, ChatError> {
    let history = history_text(store, user)?;
    let input = ChatInput {
        message: message.to_string(),
        health_stats,
        tasks,
        chat_history: (!history.is_empty()).then_some(history),
    };

    let collection = paths::chat_history(&user.uid);
    let key = store.add_document(
        &collection,
        &json!({
            "prompt": message,
            "response": "",
            "timestamp": Utc::now(),
        }),
    )?;

    let reply = chat::run(llm, &input)?;
    store.update_document(&collection, &key, &json!({ "response": reply.response }))?;

    tracing::info!(uid = %user.uid, key, "Chat turn stored");
    Ok(reply)
}
