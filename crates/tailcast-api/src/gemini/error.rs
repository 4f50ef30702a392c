use thiserror::Error;

/// Errors from the Gemini generation client.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Raised before any network call is made.
    #[error("Gemini API key not found")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response had no `candidates[0].content.parts[0].text`.
    #[error("No code returned")]
    NoCode,

    #[error("image error: {0}")]
    Image(#[from] crate::image::ImageError),
}
