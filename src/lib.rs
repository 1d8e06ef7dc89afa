pub mod chat_history; // Chat turn persistence + live message list
pub mod config;
pub mod flows; // Prediction + chat LLM flows
pub mod history; // Per-date review of stored documents
pub mod llm;
pub mod models;
pub mod predictions; // Prediction submission + dual persistence
pub mod profile; // User profile read/update
pub mod schema; // Declarative shape validation
pub mod session;
pub mod store; // Date-keyed JSON document store
pub mod todo; // Daily to-do list CRUD

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a host binary or integration harness.
/// RUST_LOG overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Vitalog core v{}", config::APP_VERSION);
}
