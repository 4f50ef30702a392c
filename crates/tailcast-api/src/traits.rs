//! Trait seams for the upstream services.
//!
//! The proxy depends on [`FigmaSource`] and the conversion flows depend on
//! [`CodeGenerator`], so both can be exercised against in-process fakes.

use std::future::Future;

use tailcast_core::models::FigmaFile;

use crate::figma::FigmaError;
use crate::image::ImagePart;

/// Fetches raw Figma documents.
pub trait FigmaSource: Send + Sync {
    /// Fetch the full document for a canonical file key.
    fn fetch_file(
        &self,
        file_key: &str,
    ) -> impl Future<Output = Result<FigmaFile, FigmaError>> + Send;
}

/// A text/vision completion backend.
pub trait CodeGenerator: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one generation call and return the raw text of the first candidate.
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// One user turn: a text prompt and an optional inline image.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImagePart>,
    pub sampling: Option<Sampling>,
}

/// Sampling parameters forwarded as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            sampling: None,
        }
    }

    pub fn with_image(mut self, image: Option<ImagePart>) -> Self {
        self.image = image;
        self
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = Some(sampling);
        self
    }
}
