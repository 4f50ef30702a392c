use serde::{Deserialize, Serialize};

use crate::image::ImagePart;
use crate::traits::{GenerationRequest, Sampling};

// ── Request ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl From<Sampling> for GenerationConfig {
    fn from(s: Sampling) -> Self {
        Self {
            temperature: s.temperature,
            top_k: s.top_k,
            top_p: s.top_p,
        }
    }
}

impl From<ImagePart> for Part {
    fn from(image: ImagePart) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type,
                data: image.data,
            },
        }
    }
}

impl From<GenerationRequest> for GenerateContentRequest {
    fn from(req: GenerationRequest) -> Self {
        let mut parts = vec![Part::Text { text: req.prompt }];
        if let Some(image) = req.image {
            parts.push(image.into());
        }
        Self {
            generation_config: req.sampling.map(Into::into),
            contents: vec![Content {
                role: "user",
                parts,
            }],
        }
    }
}

// ── Response ────────────────────────────────────────────────────

/// Every level is optional; a missing level means "no code returned".
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if non-empty.
    pub fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_text_only_request_shape() {
        let req: GenerateContentRequest = GenerationRequest::text("hello").into();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })
        );
    }

    #[test]
    fn test_image_and_sampling_request_shape() {
        let req: GenerateContentRequest = GenerationRequest::text("css")
            .with_image(Some(ImagePart {
                mime_type: "image/png".into(),
                data: "AAAA".into(),
            }))
            .with_sampling(Sampling {
                temperature: 0.5,
                top_k: 1,
                top_p: 1.0,
            })
            .into();

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "generationConfig": {"temperature": 0.5, "topK": 1, "topP": 1.0},
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "css"},
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_first_text() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "<div/>"}, {"text": "ignored"}]}}]
        }))
        .unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("<div/>"));
    }

    #[test]
    fn test_missing_levels_yield_none() {
        for body in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{}]}),
            json!({"candidates": [{"content": {}}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]}),
        ] {
            let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
            assert!(resp.first_text().is_none());
        }
    }
}
