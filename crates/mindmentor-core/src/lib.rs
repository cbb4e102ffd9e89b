pub mod api;
pub mod catalog;
pub mod config;
pub mod models;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError, ChatBackend, ChatOutcome, ChatReply, HistoryEntry};
pub use catalog::{SuggestedPrompt, GREETING, SUGGESTED_PROMPTS};
pub use config::Config;
pub use models::{ModelInfo, DEFAULT_MODEL};
pub use session::{ChatSession, Notice, NoticeKind, PendingSend};
pub use state::{ChatMessage, ChatRole};
