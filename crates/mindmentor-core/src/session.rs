//! Chat session controller.
//!
//! A session is either idle or has exactly one send in flight. Sending is
//! split into [`ChatSession::begin_send`] and [`ChatSession::complete_send`]
//! so an event loop can keep drawing while the backend works; the async
//! [`ChatSession::send`] runs both halves back to back.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::api::{ChatBackend, ChatOutcome, HistoryEntry};
use crate::catalog::GREETING;
use crate::models::DEFAULT_MODEL;
use crate::state::{ChatMessage, ChatRole};

/// How long a fallback-model notice stays up
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Shown when a failed send carries no error text
pub const GENERIC_SEND_ERROR: &str = "Failed to get response from AI";

/// Shown when the send itself blew up instead of returning an outcome
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Fallback,
}

/// A transient status line shown above the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// `None` means the notice stays until dismissed or replaced
    pub expires_at: Option<Instant>,
}

/// Everything needed to call the backend for one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub ticket: u64,
    pub message: String,
    pub history: Vec<HistoryEntry>,
    pub model: String,
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: u64,
    user_message_id: u64,
    requested_model: String,
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    notice: Option<Notice>,
    selected_model: String,
    active: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ChatSession {
    pub fn new(model: &str) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(1, GREETING, None, None)],
            in_flight: None,
            next_ticket: 1,
            notice: None,
            selected_model: model.to_string(),
            active: true,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// True while only the greeting is present
    pub fn is_empty_conversation(&self) -> bool {
        self.messages.len() <= 1
    }

    pub fn select_model(&mut self, model: &str) {
        if self.selected_model != model {
            info!(from = %self.selected_model, to = model, "model selected");
            self.selected_model = model.to_string();
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Drop the notice if its time is up. Returns true when something was cleared.
    pub fn expire_notice(&mut self) -> bool {
        let expired = self
            .notice
            .as_ref()
            .and_then(|n| n.expires_at)
            .is_some_and(|at| Instant::now() >= at);
        if expired {
            self.notice = None;
        }
        expired
    }

    /// Prior turns to send with the next message: everything but the greeting.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .skip(1)
            .map(|msg| HistoryEntry {
                role: msg.role,
                content: msg.content.clone(),
            })
            .collect()
    }

    fn next_id(&self) -> u64 {
        self.messages.last().map_or(1, |m| m.id + 1)
    }

    /// Start a send. Returns `None` without touching state when the text is
    /// blank, a send is already in flight, or the session was closed.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() || self.is_pending() || !self.active {
            return None;
        }

        let history = self.history();
        let id = self.next_id();
        self.messages.push(ChatMessage::user(id, text));
        self.notice = None;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket,
            user_message_id: id,
            requested_model: self.selected_model.clone(),
        });

        debug!(ticket, history_len = history.len(), "send started");
        Some(PendingSend {
            ticket,
            message: text.to_string(),
            history,
            model: self.selected_model.clone(),
        })
    }

    /// Apply the backend's answer for `ticket`. Stale tickets and results
    /// arriving after [`ChatSession::close`] are ignored; returns whether the
    /// outcome was applied.
    pub fn complete_send(&mut self, ticket: u64, outcome: ChatOutcome) -> bool {
        let Some(flight) = self.take_in_flight(ticket) else {
            return false;
        };

        match outcome {
            ChatOutcome::Success(reply) => {
                let id = self.next_id();
                self.messages.push(ChatMessage::assistant(
                    id,
                    reply.response,
                    Some(reply.model.clone()),
                    reply.tokens,
                ));

                if reply.fallback_used {
                    self.notice = Some(Notice {
                        kind: NoticeKind::Fallback,
                        text: format!(
                            "{} was unavailable. Response from {} instead.",
                            flight.requested_model, reply.model
                        ),
                        expires_at: Some(Instant::now() + NOTICE_TTL),
                    });
                }
                debug!(ticket, "send completed");
            }
            ChatOutcome::Failure { error } => {
                let text = if error.trim().is_empty() {
                    GENERIC_SEND_ERROR.to_string()
                } else {
                    error
                };
                self.roll_back(&flight, text);
            }
        }
        true
    }

    /// The send for `ticket` ended without an outcome (task panic or abort).
    pub fn fail_send(&mut self, ticket: u64) -> bool {
        let Some(flight) = self.take_in_flight(ticket) else {
            return false;
        };
        self.roll_back(&flight, UNEXPECTED_ERROR.to_string());
        true
    }

    /// Begin, await and complete a send in one go.
    pub async fn send<B>(&mut self, backend: &B, text: &str) -> bool
    where
        B: ChatBackend + ?Sized,
    {
        let Some(pending) = self.begin_send(text) else {
            return false;
        };
        let outcome = backend
            .send_chat_message(&pending.message, &pending.history, Some(&pending.model))
            .await;
        self.complete_send(pending.ticket, outcome)
    }

    /// Start a fresh conversation. Ignored while a send is in flight.
    pub fn reset(&mut self) -> bool {
        if self.is_pending() || !self.active {
            return false;
        }
        let model = std::mem::take(&mut self.selected_model);
        let next_ticket = self.next_ticket;
        *self = Self::new(&model);
        self.next_ticket = next_ticket;
        true
    }

    /// Mark the session as torn down. Pending results will be discarded.
    pub fn close(&mut self) {
        self.active = false;
        self.in_flight = None;
    }

    fn take_in_flight(&mut self, ticket: u64) -> Option<InFlight> {
        if !self.active {
            debug!(ticket, "session closed, dropping result");
            return None;
        }
        match &self.in_flight {
            Some(flight) if flight.ticket == ticket => self.in_flight.take(),
            _ => {
                debug!(ticket, "stale send result ignored");
                None
            }
        }
    }

    fn roll_back(&mut self, flight: &InFlight, text: String) {
        info!(error = %text, "send failed, rolling back user message");
        let is_ours = self
            .messages
            .last()
            .is_some_and(|m| m.role == ChatRole::User && m.id == flight.user_message_id);
        if is_ours {
            self.messages.pop();
        }
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text,
            expires_at: None,
        });
    }
}
