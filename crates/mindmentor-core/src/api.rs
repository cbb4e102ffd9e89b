//! HTTP client for the tutor backend.
//!
//! Every call except the legacy [`ApiClient::generate_response`] absorbs its
//! own failures: chat sends come back as a [`ChatOutcome`], health checks as
//! `false` and model listings as the static fallback list.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ModelInfo, DEFAULT_MODEL};
use crate::state::ChatRole;

/// Error text when a failed `/chat` response carries no `detail`
pub const GENERIC_CHAT_ERROR: &str = "Failed to get response";

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to connect to AI service: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("Malformed response from AI service: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One prior turn sent along with a new message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: ChatRole,
    pub content: String,
}

/// A successful chat reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    /// Model that actually answered
    pub model: String,
    pub tokens: Option<u64>,
    /// The backend answered with a different model than requested
    pub fallback_used: bool,
}

/// Result of a chat send. Transport and application failures share one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Success(ChatReply),
    Failure { error: String },
}

impl ChatOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ChatOutcome::Success(_))
    }
}

/// Anything that can answer a chat message. The session controller only
/// depends on this, so tests can script replies.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_chat_message(
        &self,
        message: &str,
        history: &[HistoryEntry],
        model: Option<&str>,
    ) -> ChatOutcome;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    model: &'a str,
    history: &'a [HistoryEntry],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
    model_used: Option<String>,
    tokens_used: Option<u64>,
    #[serde(default)]
    fallback_used: Option<bool>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_chat(
        &self,
        message: &str,
        history: &[HistoryEntry],
        model: &str,
    ) -> Result<ChatReply, ApiError> {
        let request = ChatRequest { message, model, history };

        debug!(model, history_len = history.len(), "sending chat message");
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let body = response.text().await?;
        let data: ChatResponse = serde_json::from_str(&body)?;

        let fallback_used = data.fallback_used.unwrap_or(false);
        let used = data.model_used.unwrap_or_else(|| model.to_string());
        if fallback_used {
            warn!(requested = model, used = %used, "primary model unavailable, backend used a fallback");
        }

        Ok(ChatReply {
            response: data.response.unwrap_or_default(),
            model: used,
            tokens: data.tokens_used,
            fallback_used,
        })
    }

    async fn fetch_health(&self) -> Result<HealthResponse, ApiError> {
        let response = self.client.get(self.url("/health")).send().await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>, ApiError> {
        let response = self.client.get(self.url("/models")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: "Failed to fetch models".to_string(),
            });
        }
        let body = response.text().await?;
        let models: ModelsResponse = serde_json::from_str(&body)?;
        Ok(models.models)
    }

    /// Report whether the backend says it is healthy. Never fails.
    pub async fn check_api_health(&self) -> bool {
        match self.fetch_health().await {
            Ok(health) => health.status.as_deref() == Some("healthy"),
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }

    /// Models offered by the backend, or the static list when it can't say.
    pub async fn get_available_models(&self) -> Vec<ModelInfo> {
        self.fetch_models().await.unwrap_or_else(|e| {
            warn!(error = %e, "model listing failed, using built-in list");
            ModelInfo::fallback_list()
        })
    }

    /// Legacy single-prompt endpoint. Returns whatever JSON the backend sends.
    pub async fn generate_response(
        &self,
        prompt: &str,
        model: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .post(self.url("/generate"))
            .json(&GenerateRequest { prompt, model })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: "Failed to generate response".to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn send_chat_message(
        &self,
        message: &str,
        history: &[HistoryEntry],
        model: Option<&str>,
    ) -> ChatOutcome {
        let model = model.unwrap_or(DEFAULT_MODEL);
        match self.post_chat(message, history, model).await {
            Ok(reply) => ChatOutcome::Success(reply),
            Err(e) => {
                warn!(error = %e, "chat request failed");
                ChatOutcome::Failure { error: e.to_string() }
            }
        }
    }
}

/// Pull the `detail` field out of an error body
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.detail);

    match detail {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Null) | None => GENERIC_CHAT_ERROR.to_string(),
        Some(serde_json::Value::String(_)) => GENERIC_CHAT_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_string() {
        let body = r#"{"detail": "All AI models are currently unavailable"}"#;
        assert_eq!(error_detail(body), "All AI models are currently unavailable");
    }

    #[test]
    fn test_error_detail_missing_or_not_json() {
        assert_eq!(error_detail(r#"{"message": "nope"}"#), GENERIC_CHAT_ERROR);
        assert_eq!(error_detail("<html>502</html>"), GENERIC_CHAT_ERROR);
        assert_eq!(error_detail(""), GENERIC_CHAT_ERROR);
    }

    #[test]
    fn test_error_detail_structured() {
        let body = r#"{"detail": [{"msg": "field required"}]}"#;
        assert!(error_detail(body).contains("field required"));
    }

    #[test]
    fn test_request_body_shape() {
        let history = vec![HistoryEntry {
            role: ChatRole::Assistant,
            content: "Earlier answer".to_string(),
        }];
        let request = ChatRequest {
            message: "Next question",
            model: "LLaMA",
            history: &history,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "Next question");
        assert_eq!(json["model"], "LLaMA");
        assert_eq!(json["history"][0]["role"], "assistant");
        assert_eq!(json["history"][0]["content"], "Earlier answer");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/chat"), "http://localhost:8000/chat");
    }
}
