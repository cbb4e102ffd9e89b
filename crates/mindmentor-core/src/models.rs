use serde::{Deserialize, Serialize};

/// Model requested when the user hasn't picked one
pub const DEFAULT_MODEL: &str = "DeepSeek";

/// A model the tutor backend can answer with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub description: String,
    pub provider: String,
}

impl ModelInfo {
    pub fn new(name: &str, description: &str, provider: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            provider: provider.to_string(),
        }
    }

    /// Shown when the backend's model list can't be fetched
    pub fn fallback_list() -> Vec<ModelInfo> {
        vec![
            ModelInfo::new("GPT-4", "Most capable, best for complex topics", "OpenAI"),
            ModelInfo::new("DeepSeek", "Fast and efficient responses", "DeepSeek"),
            ModelInfo::new("Claude", "Detailed explanations and analysis", "Anthropic"),
            ModelInfo::new("LLaMA", "Open-source, privacy-focused", "Meta"),
        ]
    }

    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_list_has_four_models() {
        let models = ModelInfo::fallback_list();
        assert_eq!(models.len(), 4);
        assert!(models.iter().any(|m| m.name == DEFAULT_MODEL));
    }

    #[test]
    fn test_display_name() {
        let model = ModelInfo::new("LLaMA", "Open-source", "Meta");
        assert_eq!(model.display_name(), "LLaMA (Meta)");
    }
}
