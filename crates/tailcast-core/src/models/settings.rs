use serde::{Deserialize, Serialize};

/// Storage key of the Gemini API credential.
pub const API_KEY: &str = "gemini_api_key";
/// Storage key of the Gemini model name.
pub const MODEL_NAME: &str = "gemini_model_name";

/// Model used when none has been saved.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// User-editable generation settings. A `None` field is "unset", not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
}

impl PersistedSettings {
    /// The API key with surrounding whitespace removed; blank counts as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// The saved model name, or [`DEFAULT_MODEL`].
    pub fn model_or_default(&self) -> &str {
        self.model_name
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }
}
