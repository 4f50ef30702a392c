//! Headless facade over settings, the proxy client and the generation flows.
//!
//! Every generation is tagged with a sequence number. Only the latest issued
//! request may publish its outcome; older ones resolve to
//! [`RuntimeError::Superseded`].

pub mod settings;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use tailcast_api::convert;
use tailcast_api::gemini::GeminiClient;
use tailcast_api::image::ImagePart;
use tailcast_api::proxy::ProxyClient;
use tailcast_api::traits::CodeGenerator;
use tailcast_core::config::AppConfig;
use tailcast_core::models::{PersistedSettings, ProjectedNode};

pub use settings::SettingsHandle;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("settings error: {0}")]
    Settings(String),
    #[error("{0}")]
    Api(String),
    #[error("request {0} superseded by a newer one")]
    Superseded(u64),
}

/// Which design-to-code flow produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Figma,
    Css,
    Image,
}

/// A generation that was still the latest request when it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub seq: u64,
    pub flow: Flow,
    pub code: String,
}

/// Last published outcome, for front ends that poll.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationState {
    pub seq: u64,
    pub flow: Option<Flow>,
    pub code: Option<String>,
    pub error: Option<String>,
}

pub struct Runtime {
    config: Arc<RwLock<AppConfig>>,
    settings: SettingsHandle,
    proxy: ProxyClient,
    issued: AtomicU64,
    published: Arc<RwLock<GenerationState>>,
}

impl Runtime {
    /// Open the settings database under the data directory.
    pub fn new(config: AppConfig) -> Result<Self, RuntimeError> {
        let db_path =
            AppConfig::ensure_db_path().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let settings = SettingsHandle::open(&db_path)
            .ok_or_else(|| RuntimeError::Settings("failed to open settings database".into()))?;
        Ok(Self::with_settings(config, settings))
    }

    pub fn with_settings(config: AppConfig, settings: SettingsHandle) -> Self {
        let proxy = ProxyClient::new(config.proxy.base_url.clone());
        Self {
            config: Arc::new(RwLock::new(config)),
            settings,
            proxy,
            issued: AtomicU64::new(0),
            published: Arc::new(RwLock::new(GenerationState::default())),
        }
    }

    // ── Settings ─────────────────────────────────────────────────

    pub async fn get_config(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    pub async fn get_settings(&self) -> Result<PersistedSettings, RuntimeError> {
        self.settings
            .load()
            .await
            .map_err(|e| RuntimeError::Settings(e.to_string()))
    }

    /// Store the `Some` fields of `settings`, leaving the rest untouched.
    pub async fn save_settings(&self, settings: PersistedSettings) -> Result<(), RuntimeError> {
        self.settings
            .save(settings)
            .await
            .map_err(|e| RuntimeError::Settings(e.to_string()))?;
        tracing::info!("settings saved");
        Ok(())
    }

    pub async fn clear_setting(&self, key: &'static str) -> Result<(), RuntimeError> {
        self.settings
            .clear(key)
            .await
            .map_err(|e| RuntimeError::Settings(e.to_string()))
    }

    // ── Design input ─────────────────────────────────────────────

    /// Fetch the projected design for a file key or Figma URL via the proxy.
    pub async fn fetch_design(&self, key_or_url: &str) -> Result<ProjectedNode, RuntimeError> {
        self.proxy
            .fetch_design(key_or_url)
            .await
            .map_err(|e| RuntimeError::Api(e.to_string()))
    }

    // ── Generation ───────────────────────────────────────────────

    /// The generator configured by the saved settings.
    ///
    /// Fails with "Gemini API key not found" when no key is stored, before
    /// any request leaves the process.
    pub async fn generator(&self) -> Result<GeminiClient, RuntimeError> {
        let settings = self.get_settings().await?;
        let config = self.config.read().await;
        GeminiClient::from_settings(&config.gemini, &settings)
            .map_err(|e| RuntimeError::Api(e.to_string()))
    }

    pub async fn convert_figma(&self, design: &ProjectedNode) -> Result<Generation, RuntimeError> {
        let seq = self.next_seq();
        match self.generator().await {
            Ok(generator) => self.convert_figma_with(seq, &generator, design).await,
            Err(e) => self.publish(seq, Flow::Figma, Err(e)).await,
        }
    }

    pub async fn convert_css(
        &self,
        css: &str,
        image: Option<ImagePart>,
    ) -> Result<Generation, RuntimeError> {
        let seq = self.next_seq();
        match self.generator().await {
            Ok(generator) => self.convert_css_with(seq, &generator, css, image).await,
            Err(e) => self.publish(seq, Flow::Css, Err(e)).await,
        }
    }

    pub async fn convert_image(&self, image: ImagePart) -> Result<Generation, RuntimeError> {
        let seq = self.next_seq();
        match self.generator().await {
            Ok(generator) => self.convert_image_with(seq, &generator, image).await,
            Err(e) => self.publish(seq, Flow::Image, Err(e)).await,
        }
    }

    pub async fn convert_figma_with<G: CodeGenerator>(
        &self,
        seq: u64,
        generator: &G,
        design: &ProjectedNode,
    ) -> Result<Generation, RuntimeError> {
        let outcome = convert::figma_to_react(generator, design).await;
        self.publish(seq, Flow::Figma, outcome.map_err(api_error)).await
    }

    pub async fn convert_css_with<G: CodeGenerator>(
        &self,
        seq: u64,
        generator: &G,
        css: &str,
        image: Option<ImagePart>,
    ) -> Result<Generation, RuntimeError> {
        let outcome = convert::css_to_react(generator, css, image).await;
        self.publish(seq, Flow::Css, outcome.map_err(api_error)).await
    }

    pub async fn convert_image_with<G: CodeGenerator>(
        &self,
        seq: u64,
        generator: &G,
        image: ImagePart,
    ) -> Result<Generation, RuntimeError> {
        let outcome = convert::image_to_react(generator, image).await;
        self.publish(seq, Flow::Image, outcome.map_err(api_error)).await
    }

    /// Issue the next sequence number; it becomes the only one allowed to publish.
    pub fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn generation_state(&self) -> GenerationState {
        self.published.read().await.clone()
    }

    async fn publish(
        &self,
        seq: u64,
        flow: Flow,
        outcome: Result<String, RuntimeError>,
    ) -> Result<Generation, RuntimeError> {
        let mut published = self.published.write().await;
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(seq, ?flow, "dropping stale generation");
            return Err(RuntimeError::Superseded(seq));
        }

        match outcome {
            Ok(code) => {
                tracing::info!(seq, ?flow, bytes = code.len(), "generation finished");
                *published = GenerationState {
                    seq,
                    flow: Some(flow),
                    code: Some(code.clone()),
                    error: None,
                };
                Ok(Generation { seq, flow, code })
            }
            Err(e) => {
                tracing::warn!(seq, ?flow, "generation failed: {e}");
                *published = GenerationState {
                    seq,
                    flow: Some(flow),
                    code: None,
                    error: Some(e.to_string()),
                };
                Err(e)
            }
        }
    }
}

fn api_error<E: std::error::Error>(e: E) -> RuntimeError {
    RuntimeError::Api(e.to_string())
}
