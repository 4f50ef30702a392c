use reqwest::Client;

use tailcast_core::config::FigmaConfig;
use tailcast_core::error::TailcastError;
use tailcast_core::json;
use tailcast_core::models::FigmaFile;

use super::error::FigmaError;
use crate::traits::FigmaSource;

const TOKEN_HEADER: &str = "X-Figma-Token";

/// Figma REST API v1 client.
pub struct FigmaClient {
    api_base: String,
    token: Option<String>,
    http: Client,
}

impl FigmaClient {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &FigmaConfig) -> Self {
        Self::new(config.api_base.clone(), config.token.clone())
    }

    fn file_url(&self, file_key: &str) -> String {
        format!("{}/v1/files/{file_key}", self.api_base)
    }

    /// Turn a non-success response into [`FigmaError::Upstream`] with its JSON body.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, FigmaError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FigmaError::Parse(format!("error body is not JSON: {e}")))?;
        tracing::warn!(status, "Figma API error");
        Err(FigmaError::Upstream { status, body })
    }
}

impl FigmaSource for FigmaClient {
    async fn fetch_file(&self, file_key: &str) -> Result<FigmaFile, FigmaError> {
        let mut req = self.http.get(self.file_url(file_key));
        if let Some(ref token) = self.token {
            req = req.header(TOKEN_HEADER, token);
        }

        let resp = Self::check_response(req.send().await?).await?;
        decode_file(&resp.bytes().await?)
    }
}

/// Node trees routinely nest past serde_json's default recursion limit.
fn decode_file(body: &[u8]) -> Result<FigmaFile, FigmaError> {
    json::decode_deep(body).map_err(|e| match e {
        TailcastError::TooDeep(_) => FigmaError::Shape(e.to_string()),
        other => FigmaError::Parse(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_strips_trailing_slash() {
        let client = FigmaClient::new("https://api.figma.com/", None);
        assert_eq!(
            client.file_url("ABC123"),
            "https://api.figma.com/v1/files/ABC123"
        );
    }

    #[test]
    fn test_from_config() {
        let config = FigmaConfig {
            api_base: "http://localhost:9000".into(),
            token: Some("figd_x".into()),
        };
        let client = FigmaClient::from_config(&config);
        assert_eq!(client.token.as_deref(), Some("figd_x"));
        assert_eq!(client.file_url("k"), "http://localhost:9000/v1/files/k");
    }

    fn nested_file(levels: usize) -> String {
        let mut node = r#"{"type":"TEXT","characters":"deep"}"#.to_string();
        for _ in 0..levels {
            node = format!(r#"{{"type":"FRAME","children":[{node}]}}"#);
        }
        format!(r#"{{"document":{{"children":[{{"children":[{node}]}}]}}}}"#)
    }

    #[test]
    fn test_decode_deeply_nested_file() {
        let file = decode_file(nested_file(70).as_bytes()).unwrap();
        let frame = file.first_frame().unwrap();
        assert!(frame.is_type("FRAME"));
    }

    #[test]
    fn test_decode_errors() {
        let err = decode_file(nested_file(1000).as_bytes()).unwrap_err();
        assert!(matches!(err, FigmaError::Shape(_)));
        assert!(err.to_string().contains("nests deeper than"));

        let err = decode_file(b"<html>").unwrap_err();
        assert!(matches!(err, FigmaError::Parse(_)));
    }
}
