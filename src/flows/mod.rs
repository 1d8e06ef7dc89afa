//! LLM flows: render a prompt, call the model once, validate the output
//! shape. No retry, no caching, no partial results — a flow either returns
//! the full validated output or a `GenerationError`.

pub mod chat;
pub mod prediction;

use crate::schema::ValidationError;

/// The LLM call failed or its response did not validate.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Cannot reach LLM endpoint at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("LLM endpoint returned status {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Failed to parse endpoint response: {0}")]
    ResponseParsing(String),

    #[error("Malformed model output: {0}")]
    MalformedResponse(String),

    #[error("Model output failed shape validation: {0}")]
    ShapeMismatch(#[from] ValidationError),
}

/// Pull the JSON object out of free-form model text.
///
/// Models wrap JSON in prose or a ```json fence at will; accept a fenced
/// block first, then fall back to the outermost brace pair.
pub fn extract_json_block(response: &str) -> Result<serde_json::Value, GenerationError> {
    let candidate = if let Some(fence_start) = response.find("```json") {
        let content_start = fence_start + 7;
        let content_end = response[content_start..]
            .find("```")
            .ok_or_else(|| GenerationError::MalformedResponse("Unclosed JSON block".into()))?;
        response[content_start..content_start + content_end].trim()
    } else {
        let start = response
            .find('{')
            .ok_or_else(|| GenerationError::MalformedResponse("No JSON object found".into()))?;
        let end = response
            .rfind('}')
            .filter(|&end| end > start)
            .ok_or_else(|| GenerationError::MalformedResponse("Unterminated JSON object".into()))?;
        response[start..=end].trim()
    };

    serde_json::from_str(candidate)
        .map_err(|e| GenerationError::MalformedResponse(format!("Invalid JSON: {e}")))
}
