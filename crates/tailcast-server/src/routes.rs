//! Request routing for the Figma proxy.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body as _;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Response, StatusCode};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use tailcast_api::figma::FigmaError;
use tailcast_api::traits::FigmaSource;

use crate::state::AppState;

pub const FILE_ROUTE: &str = "/api/figma/file/";
pub const FETCH_FAILED: &str = "Failed to fetch Figma file";

pub type Body = Full<Bytes>;

/// Route one request. Every response carries the CORS headers.
pub async fn handle<F: FigmaSource>(
    state: &AppState<F>,
    method: &Method,
    path: &str,
) -> Response<Body> {
    let segment = path
        .strip_prefix(FILE_ROUTE)
        .filter(|key| !key.is_empty() && !key.contains('/'));

    let mut response = match (method, segment) {
        (&Method::OPTIONS, _) => preflight(),
        (&Method::GET, Some(raw_key)) => figma_file(state, raw_key).await,
        (&Method::HEAD, Some(raw_key)) => without_body(figma_file(state, raw_key).await),
        _ => json(StatusCode::NOT_FOUND, &json!({ "error": "Not found" })),
    };

    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

async fn figma_file<F: FigmaSource>(state: &AppState<F>, raw_key: &str) -> Response<Body> {
    let raw_key = percent_decode_str(raw_key).decode_utf8_lossy();
    match state.fetch_design(&raw_key).await {
        Ok((payload, cache)) => {
            info!(file_key = %raw_key, ?cache, "served design");
            json(StatusCode::OK, &payload)
        }
        Err(FigmaError::Upstream { status, body }) => {
            warn!(file_key = %raw_key, status, "forwarding upstream error");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            json(status, &body)
        }
        Err(e) => {
            error!(file_key = %raw_key, "Figma Fetch Error: {e}");
            json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": FETCH_FAILED }),
            )
        }
    }
}

/// HEAD keeps the GET status and headers, including the length of the body
/// that GET would send.
fn without_body(mut response: Response<Body>) -> Response<Body> {
    let len = response.body().size_hint().exact().unwrap_or(0);
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    *response.body_mut() = Body::default();
    response
}

fn preflight() -> Response<Body> {
    let mut response = Response::new(Body::default());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,HEAD,PUT,PATCH,POST,DELETE"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    response
}

fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response<Body> {
    let (status, bytes) = match serde_json::to_vec(value) {
        Ok(bytes) => (status, Bytes::from(bytes)),
        Err(e) => {
            error!("failed to serialize response: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"error":"Failed to fetch Figma file"}"#),
            )
        }
    };
    let mut response = Response::new(Full::new(bytes));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}
