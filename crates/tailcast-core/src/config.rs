use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::TailcastError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable that overrides `figma.token`.
pub const FIGMA_TOKEN_ENV: &str = "FIGMA_TOKEN";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub figma: FigmaConfig,
    pub gemini: GeminiConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigmaConfig {
    pub api_base: String,
    /// Personal access token sent upstream. Not validated at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_base: String,
    pub default_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Where clients reach the Figma proxy.
    pub base_url: String,
}

impl AppConfig {
    /// Load config: user file (if exists) over built-in defaults, then env overrides.
    pub fn load() -> Result<Self, TailcastError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit path, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, TailcastError> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading user config");
            let user_str =
                std::fs::read_to_string(path).map_err(|e| TailcastError::Config(e.to_string()))?;
            toml::from_str(&user_str).map_err(|e| TailcastError::Config(e.to_string()))
        } else {
            tracing::debug!(path = %path.display(), "no user config, using defaults");
            toml::from_str(DEFAULT_CONFIG).map_err(|e| TailcastError::Config(e.to_string()))
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), TailcastError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), TailcastError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TailcastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(FIGMA_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("Figma token taken from {FIGMA_TOKEN_ENV}");
                self.figma.token = Some(token);
            }
        }
    }

    /// Socket address string the proxy binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the settings database.
    pub fn db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("tailcast.db"))
            .unwrap_or_else(|| PathBuf::from("tailcast.db"))
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, TailcastError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "tailcast")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
