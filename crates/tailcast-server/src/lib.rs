//! HTTP proxy in front of the Figma REST API.
//!
//! Serves `GET /api/figma/file/{fileKey}` with the projected first frame of
//! the file, caching successful projections for the life of the process.

pub mod routes;
pub mod state;

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use tailcast_api::traits::FigmaSource;

pub use state::AppState;

/// Bind a listener on `addr` (`host:port`).
pub async fn bind(addr: &str) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Accept connections until `shutdown` resolves.
pub async fn serve<F, S>(
    listener: TcpListener,
    state: Arc<AppState<F>>,
    shutdown: S,
) -> std::io::Result<()>
where
    F: FigmaSource + 'static,
    S: Future<Output = ()>,
{
    info!(addr = %listener.local_addr()?, "proxy listening");
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            },
            () = &mut shutdown => {
                info!("proxy shutting down");
                return Ok(());
            }
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let state = Arc::clone(&state);
                async move {
                    let response = routes::handle(&state, req.method(), req.uri().path()).await;
                    debug!(method = %req.method(), path = req.uri().path(), status = %response.status(), "request");
                    Ok::<_, Infallible>(response)
                }
            });
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!(%peer, "connection error: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use tailcast_api::figma::FigmaError;
    use tailcast_core::models::FigmaFile;

    use super::*;

    struct OneFrame;

    impl FigmaSource for OneFrame {
        async fn fetch_file(&self, _file_key: &str) -> Result<FigmaFile, FigmaError> {
            serde_json::from_value(json!({
                "document": {"children": [{"children": [{"name": "Hero", "type": "FRAME"}]}]}
            }))
            .map_err(|e| FigmaError::Parse(e.to_string()))
        }
    }

    #[tokio::test]
    async fn test_serves_over_http_until_shutdown() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, Arc::new(AppState::new(OneFrame)), async move {
            let _ = stop_rx.await;
        }));

        let resp = reqwest::get(format!("http://{addr}/api/figma/file/KEY"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["access-control-allow-origin"].to_str().unwrap(),
            "*"
        );
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["figmaJson"]["name"], "Hero");

        let resp = reqwest::get(format!("http://{addr}/nope")).await.unwrap();
        assert_eq!(resp.status(), 404);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
