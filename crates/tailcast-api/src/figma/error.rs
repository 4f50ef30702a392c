use thiserror::Error;

/// Errors from the Figma REST client.
#[derive(Debug, Error)]
pub enum FigmaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; the JSON body is kept verbatim for forwarding.
    #[error("Figma API error (status {status})")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unexpected document shape: {0}")]
    Shape(String),
}
