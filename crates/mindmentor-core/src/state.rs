//! UI-agnostic conversation types
//!
//! These structures are shared by the session controller and any front-end
//! that renders it, and don't depend on a specific UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single message in a tutoring conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sequence position within the session, starting at 1
    pub id: u64,
    pub role: ChatRole,
    /// Plain text for the user, Markdown for the assistant
    pub content: String,
    pub timestamp: DateTime<Local>,
    /// Model that produced an assistant reply
    pub model: Option<String>,
    /// Token usage reported by the backend, if any
    pub token_count: Option<u64>,
}

impl ChatMessage {
    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            role: ChatRole::User,
            content: content.into(),
            timestamp: Local::now(),
            model: None,
            token_count: None,
        }
    }

    pub fn assistant(
        id: u64,
        content: impl Into<String>,
        model: Option<String>,
        token_count: Option<u64>,
    ) -> Self {
        Self {
            id,
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Local::now(),
            model,
            token_count,
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}
