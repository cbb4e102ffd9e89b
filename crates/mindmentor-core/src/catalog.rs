//! Static content shown by the tutor view

/// Synthetic first message of every session. Never sent to the backend.
pub const GREETING: &str = "Hi! I'm your AI tutor. I'm here to help you learn anything you'd like. What would you like to explore today?";

/// A conversation starter offered while the session is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedPrompt {
    pub text: &'static str,
    pub category: &'static str,
}

pub const SUGGESTED_PROMPTS: [SuggestedPrompt; 6] = [
    SuggestedPrompt { text: "Explain quantum physics", category: "Science" },
    SuggestedPrompt { text: "Teach me React hooks", category: "Programming" },
    SuggestedPrompt { text: "Help with statistics", category: "Mathematics" },
    SuggestedPrompt { text: "Analyze Shakespeare", category: "Literature" },
    SuggestedPrompt { text: "World War II history", category: "History" },
    SuggestedPrompt { text: "Art history basics", category: "Arts" },
];
