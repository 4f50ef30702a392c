use std::sync::Arc;

use tailcast_api::figma::FigmaError;
use tailcast_api::traits::FigmaSource;
use tailcast_core::cache::{CacheStatus, ResponseCache};
use tailcast_core::file_key;
use tailcast_core::models::FigmaPayload;
use tailcast_core::projection::project_node;

/// Shared by every connection: the upstream source and the response cache.
pub struct AppState<F> {
    source: F,
    cache: Arc<ResponseCache<FigmaPayload>>,
}

impl<F: FigmaSource> AppState<F> {
    pub fn new(source: F) -> Self {
        Self::with_cache(source, Arc::default())
    }

    pub fn with_cache(source: F, cache: Arc<ResponseCache<FigmaPayload>>) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn cache(&self) -> &ResponseCache<FigmaPayload> {
        &self.cache
    }

    /// Resolve `raw_key`, then serve the projected first frame from cache or upstream.
    ///
    /// The projection root is the first frame of the first page. A document
    /// without one fails with [`FigmaError::Shape`]; failures are not cached.
    pub async fn fetch_design(
        &self,
        raw_key: &str,
    ) -> Result<(FigmaPayload, CacheStatus), FigmaError> {
        let key = file_key::resolve(raw_key);
        self.cache
            .get_or_fetch(&key, || async {
                let file = self.source.fetch_file(&key).await?;
                let frame = file
                    .first_frame()
                    .ok_or_else(|| FigmaError::Shape("first page has no frame".into()))?;
                Ok::<_, FigmaError>(FigmaPayload {
                    figma_json: project_node(frame),
                })
            })
            .await
    }
}
