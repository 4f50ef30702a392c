use reqwest::Client;

use tailcast_core::config::GeminiConfig;
use tailcast_core::models::PersistedSettings;

use super::error::GeminiError;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::traits::{CodeGenerator, GenerationRequest};

const FALLBACK_MESSAGE: &str = "Gemini request failed";

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    api_base: String,
    api_key: String,
    model: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            http: Client::new(),
        }
    }

    /// Build a client from saved settings, failing before any network call
    /// when no API key is stored.
    pub fn from_settings(
        config: &GeminiConfig,
        settings: &PersistedSettings,
    ) -> Result<Self, GeminiError> {
        let api_key = settings.api_key().ok_or(GeminiError::MissingApiKey)?;
        let model = settings
            .model_name
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(config.default_model.as_str());
        Ok(Self::new(config.api_base.clone(), api_key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/models/{}:generateContent", self.api_base, self.model)
    }
}

impl CodeGenerator for GeminiClient {
    type Error = GeminiError;

    async fn generate(&self, request: GenerationRequest) -> Result<String, GeminiError> {
        let body = GenerateContentRequest::from(request);
        tracing::debug!(model = %self.model, "sending generateContent request");

        let resp = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() {
            let message = parsed
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
            tracing::warn!(status = status.as_u16(), %message, "Gemini API error");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parsed.first_text().ok_or(GeminiError::NoCode)
    }
}
