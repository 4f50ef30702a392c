//! Client for the local Figma proxy (`GET /api/figma/file/:fileKey`).

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;

use tailcast_core::json;
use tailcast_core::models::{FigmaPayload, ProjectedNode};

const FALLBACK_MESSAGE: &str = "Failed to fetch Figma file";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Please enter a Figma file key.")]
    EmptyKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
}

pub struct ProxyClient {
    base_url: String,
    http: Client,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// The key (or pasted URL) travels as a single encoded path segment.
    fn file_url(&self, key_or_url: &str) -> String {
        format!(
            "{}/api/figma/file/{}",
            self.base_url,
            utf8_percent_encode(key_or_url, NON_ALPHANUMERIC)
        )
    }

    /// Fetch the projected design for a key or Figma URL.
    pub async fn fetch_design(&self, key_or_url: &str) -> Result<ProjectedNode, ProxyError> {
        let key_or_url = key_or_url.trim();
        if key_or_url.is_empty() {
            return Err(ProxyError::EmptyKey);
        }

        let resp = self.http.get(self.file_url(key_or_url)).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
            tracing::warn!(status = status.as_u16(), %message, "proxy request failed");
            return Err(ProxyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        decode_payload(status.as_u16(), &body)
    }
}

fn decode_payload(status: u16, body: &[u8]) -> Result<ProjectedNode, ProxyError> {
    let payload: FigmaPayload = json::decode_deep(body).map_err(|e| ProxyError::Api {
        status,
        message: format!("{FALLBACK_MESSAGE}: {e}"),
    })?;
    Ok(payload.figma_json)
}

/// Pull `error` out of an error body. Figma's own errors use `err`, which is
/// not looked at, so forwarded upstream failures fall back to the generic text.
fn error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.error? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_encodes_pasted_urls() {
        let client = ProxyClient::new("http://localhost:4000/");
        assert_eq!(
            client.file_url("ABC123"),
            "http://localhost:4000/api/figma/file/ABC123"
        );
        assert_eq!(
            client.file_url("https://www.figma.com/file/ABC/x"),
            "http://localhost:4000/api/figma/file/https%3A%2F%2Fwww%2Efigma%2Ecom%2Ffile%2FABC%2Fx"
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(br#"{"error":"Failed to fetch Figma file"}"#).as_deref(),
            Some("Failed to fetch Figma file")
        );
        assert_eq!(error_message(br#"{"status":403,"err":"Invalid token"}"#), None);
        assert_eq!(error_message(b"not json"), None);
    }

    #[test]
    fn test_decode_deep_payload() {
        let mut node = r#"{"name":"Leaf","children":[]}"#.to_string();
        for _ in 0..80 {
            node = format!(r#"{{"type":"FRAME","children":[{node}]}}"#);
        }
        let design = decode_payload(200, format!(r#"{{"figmaJson":{node}}}"#).as_bytes()).unwrap();
        assert_eq!(design.children.len(), 1);

        let err = decode_payload(200, b"{\"figmaJson\":").unwrap_err();
        assert!(matches!(err, ProxyError::Api { status: 200, .. }));
        assert!(err.to_string().starts_with(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_empty_key_rejected_before_network() {
        let client = ProxyClient::new("http://127.0.0.1:9");
        let err = client.fetch_design("   ").await.unwrap_err();
        assert!(matches!(err, ProxyError::EmptyKey));
    }
}
