use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::models::DEFAULT_MODEL;

/// Environment variable selecting the tutor backend
pub const API_URL_ENV: &str = "MINDMENTOR_API_URL";

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub default_model: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_default_model(model: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.default_model = Some(model.to_string());
        config.save()
    }

    /// Backend base URL: explicit override, then the environment, then the
    /// config file, then the local default. Blank values are skipped and
    /// trailing slashes are trimmed.
    pub fn resolve_api_url(&self, cli_override: Option<&str>) -> String {
        let env_url = std::env::var(API_URL_ENV).ok();
        self.resolve_api_url_with(cli_override, env_url.as_deref())
    }

    fn resolve_api_url_with(&self, cli_override: Option<&str>, env_url: Option<&str>) -> String {
        let url = [cli_override, env_url, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        url.trim_end_matches('/').to_string()
    }

    pub fn resolve_model(&self, cli_override: Option<&str>) -> String {
        cli_override
            .map(str::to_string)
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("mindmentor").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_url: Some("http://tutor.local:9000".to_string()),
            default_model: Some("LLaMA".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_cli_override_wins_and_is_trimmed() {
        let config = Config {
            api_url: Some("http://from-file".to_string()),
            default_model: None,
        };
        assert_eq!(
            config.resolve_api_url(Some("http://flag:8000/")),
            "http://flag:8000"
        );
    }

    #[test]
    fn test_api_url_precedence() {
        let with_file = Config {
            api_url: Some("http://from-file:8000".to_string()),
            default_model: None,
        };

        assert_eq!(
            with_file.resolve_api_url_with(None, Some("http://from-env:9000/")),
            "http://from-env:9000"
        );
        assert_eq!(with_file.resolve_api_url_with(None, None), "http://from-file:8000");
        assert_eq!(with_file.resolve_api_url_with(None, Some("  ")), "http://from-file:8000");
        assert_eq!(Config::new().resolve_api_url_with(None, None), DEFAULT_API_URL);
        assert_eq!(Config::new().resolve_api_url_with(None, Some("")), DEFAULT_API_URL);
    }

    #[test]
    fn test_blank_cli_override_is_ignored() {
        let with_file = Config {
            api_url: Some("http://from-file:8000".to_string()),
            default_model: None,
        };
        assert_eq!(
            with_file.resolve_api_url_with(Some(""), Some("http://from-env:9000")),
            "http://from-env:9000"
        );
        assert_eq!(with_file.resolve_api_url_with(Some("   "), None), "http://from-file:8000");
        assert_eq!(Config::new().resolve_api_url_with(Some(""), None), DEFAULT_API_URL);
    }

    // The only test touching the process environment
    #[test]
    fn test_api_url_reads_environment() {
        let with_file = Config {
            api_url: Some("http://from-file:8000".to_string()),
            default_model: None,
        };

        std::env::set_var(API_URL_ENV, "http://from-env:9000/");
        assert_eq!(with_file.resolve_api_url(None), "http://from-env:9000");
        assert_eq!(Config::new().resolve_api_url(None), "http://from-env:9000");

        std::env::set_var(API_URL_ENV, " ");
        assert_eq!(with_file.resolve_api_url(None), "http://from-file:8000");

        std::env::remove_var(API_URL_ENV);
        assert_eq!(with_file.resolve_api_url(None), "http://from-file:8000");
        assert_eq!(Config::new().resolve_api_url(None), DEFAULT_API_URL);
    }

    #[test]
    fn test_resolve_model() {
        let config = Config {
            api_url: None,
            default_model: Some("Minimax".to_string()),
        };
        assert_eq!(config.resolve_model(None), "Minimax");
        assert_eq!(config.resolve_model(Some("LLaMA")), "LLaMA");
        assert_eq!(Config::new().resolve_model(None), DEFAULT_MODEL);
    }
}
