use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use mindmentor_core::{
    ApiClient, ChatBackend, ChatOutcome, ChatSession, Config, ModelInfo, SUGGESTED_PROMPTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Checking,
    Online,
    Offline,
}

impl ApiStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApiStatus::Checking => "checking",
            ApiStatus::Online => "online",
            ApiStatus::Offline => "offline",
        }
    }
}

/// A send running on the runtime, tagged with its session ticket
pub struct SendTask {
    pub ticket: u64,
    pub handle: JoinHandle<ChatOutcome>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: ChatSession,
    pub client: ApiClient,

    // Input line
    pub input: String,
    pub cursor: usize, // cursor position in chars

    // Chat scrolling
    pub chat_scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16, // inner height, updated during render
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend status and background work
    pub api_status: ApiStatus,
    pub send_task: Option<SendTask>,
    pub health_task: Option<JoinHandle<bool>>,
    pub models_task: Option<JoinHandle<Vec<ModelInfo>>>,

    // Suggested prompts (shown while the conversation is empty)
    pub suggestion_state: ListState,

    // Model picker state
    pub show_model_picker: bool,
    pub available_models: Vec<ModelInfo>,
    pub model_picker_state: ListState,
}

impl App {
    pub fn new(client: ApiClient, model: &str) -> Self {
        let mut suggestion_state = ListState::default();
        suggestion_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session: ChatSession::new(model),
            client,

            input: String::new(),
            cursor: 0,

            chat_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_area: None,

            animation_frame: 0,

            api_status: ApiStatus::Checking,
            send_task: None,
            health_task: None,
            models_task: None,

            suggestion_state,

            show_model_picker: false,
            available_models: ModelInfo::fallback_list(),
            model_picker_state: ListState::default(),
        }
    }

    /// Kick off the one-time health check and model listing
    pub fn start_background_checks(&mut self) {
        let client = self.client.clone();
        self.health_task = Some(tokio::spawn(async move { client.check_api_health().await }));

        let client = self.client.clone();
        self.models_task = Some(tokio::spawn(async move { client.get_available_models().await }));
    }

    /// Send the input line. Does nothing when it's blank or a reply is pending.
    pub fn submit_input(&mut self) {
        let Some(pending) = self.session.begin_send(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.follow_bottom = true;

        let ticket = pending.ticket;
        let client = self.client.clone();
        let handle = tokio::spawn(async move {
            client
                .send_chat_message(&pending.message, &pending.history, Some(&pending.model))
                .await
        });
        self.send_task = Some(SendTask { ticket, handle });
    }

    /// Apply the results of any background tasks that have finished
    pub async fn poll_tasks(&mut self) {
        if self.send_task.as_ref().is_some_and(|t| t.handle.is_finished()) {
            if let Some(task) = self.send_task.take() {
                match task.handle.await {
                    Ok(outcome) => {
                        self.session.complete_send(task.ticket, outcome);
                    }
                    Err(e) => {
                        warn!(error = %e, "send task ended without a result");
                        self.session.fail_send(task.ticket);
                    }
                }
                self.follow_bottom = true;
            }
        }

        if self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.health_task.take() {
                let healthy = task.await.unwrap_or(false);
                self.api_status = if healthy { ApiStatus::Online } else { ApiStatus::Offline };
                info!(status = self.api_status.label(), "api health checked");
            }
        }

        if self.models_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.models_task.take() {
                if let Ok(models) = task.await {
                    if !models.is_empty() {
                        self.available_models = models;
                    }
                }
            }
        }
    }

    /// Called on every tick
    pub fn tick(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.session.expire_notice();
    }

    /// Stop background work and make sure nothing lands in the session afterwards
    pub fn shutdown(&mut self) {
        if let Some(task) = self.send_task.take() {
            task.handle.abort();
        }
        if let Some(task) = self.health_task.take() {
            task.abort();
        }
        if let Some(task) = self.models_task.take() {
            task.abort();
        }
        self.session.close();
    }

    pub fn new_conversation(&mut self) {
        if self.session.reset() {
            self.chat_scroll = 0;
            self.follow_bottom = true;
            self.suggestion_state.select(Some(0));
        }
    }

    // Suggested prompts
    pub fn suggestions_visible(&self) -> bool {
        self.session.is_empty_conversation() && !self.session.is_pending()
    }

    pub fn suggestion_nav_down(&mut self) {
        let i = self.suggestion_state.selected().unwrap_or(0);
        self.suggestion_state.select(Some((i + 1).min(SUGGESTED_PROMPTS.len() - 1)));
    }

    pub fn suggestion_nav_up(&mut self) {
        let i = self.suggestion_state.selected().unwrap_or(0);
        self.suggestion_state.select(Some(i.saturating_sub(1)));
    }

    /// Copy the highlighted suggestion into the input line
    pub fn use_suggestion(&mut self) {
        if let Some(prompt) = self
            .suggestion_state
            .selected()
            .and_then(|i| SUGGESTED_PROMPTS.get(i))
        {
            self.input = prompt.text.to_string();
            self.cursor = self.input.chars().count();
            self.input_mode = InputMode::Editing;
        }
    }

    // Chat scrolling
    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Render clamps the offset and re-enables following at the bottom
    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_bottom = false;
        self.chat_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }

    // Model picker
    pub fn open_model_picker(&mut self) {
        let current = self
            .available_models
            .iter()
            .position(|m| m.name == self.session.selected_model())
            .unwrap_or(0);
        self.model_picker_state.select(Some(current));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = self.available_models.len();
        if len > 0 {
            let i = self.model_picker_state.selected().unwrap_or(0);
            self.model_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        if let Some(model) = self
            .model_picker_state
            .selected()
            .and_then(|i| self.available_models.get(i))
        {
            let name = model.name.clone();
            self.session.select_model(&name);
            if let Err(e) = Config::save_default_model(&name) {
                warn!(error = %e, "could not save default model");
            }
        }
        self.show_model_picker = false;
    }
}
