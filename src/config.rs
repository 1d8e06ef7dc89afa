use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Vitalog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Ollama endpoint when VITALOG_LLM_URL is unset.
pub const DEFAULT_LLM_URL: &str = "http://localhost:11434";

/// Default model when VITALOG_LLM_MODEL is unset.
pub const DEFAULT_LLM_MODEL: &str = "llama3:8b";

/// Get the application data directory
/// ~/Vitalog/ on all platforms (user-visible by design)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Vitalog")
}

/// Get the path of the per-installation document database.
pub fn store_db_path() -> PathBuf {
    app_data_dir().join("documents.db")
}

/// LLM endpoint base URL, overridable via VITALOG_LLM_URL.
pub fn llm_base_url() -> String {
    std::env::var("VITALOG_LLM_URL").unwrap_or_else(|_| DEFAULT_LLM_URL.to_string())
}

/// Model name passed to the LLM endpoint, overridable via VITALOG_LLM_MODEL.
pub fn llm_model() -> String {
    std::env::var("VITALOG_LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string())
}

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "info,vitalog=debug"
}
