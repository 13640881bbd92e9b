//! Fetch strategies
//!
//! Cache-first for static assets, network-first with a deadline for API
//! data. Successful (exactly 200) network responses are copied into the
//! runtime store in the background; the caller gets the live response either
//! way. Transport failures never escape: they degrade to a cached entry or a
//! synthesized 503.

use viza_net::{fetch_with_timeout, Fetch, Method, Request, Response};

use crate::config::OFFLINE_MESSAGE;
use crate::worker::ServiceWorker;

/// Plain-text 503 for pages and assets
pub fn offline_text_response() -> Response {
    Response::new(503, format!("Offline - {}", OFFLINE_MESSAGE))
        .with_header("Content-Type", "text/plain; charset=utf-8")
}

/// JSON 503 for API calls
pub fn offline_json_response() -> Response {
    let body = serde_json::json!({
        "error": "Offline",
        "message": OFFLINE_MESSAGE,
    });
    Response::new(503, body.to_string()).with_header("Content-Type", "application/json")
}

impl<F: Fetch> ServiceWorker<F> {
    pub(crate) async fn cache_first(&self, request: &Request) -> Response {
        if let Some(cached) = self.caches().match_request(request).await {
            tracing::debug!(url = %request.url, "serving from cache");
            return cached;
        }

        tracing::debug!(url = %request.url, "fetching from network");
        match self.fetcher().fetch(request).await {
            Ok(response) => {
                if response.status == 200 {
                    self.store_in_background(request, response.clone()).await;
                }
                response
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache-first fetch failed");
                self.offline_page().await
            }
        }
    }

    pub(crate) async fn network_first(&self, request: &Request) -> Response {
        let timeout = self.config().network_timeout;
        match fetch_with_timeout(self.fetcher(), request, timeout).await {
            // non-200 statuses are the backend's answer, not a failure
            Ok(response) => {
                if response.status == 200 {
                    self.store_in_background(request, response.clone()).await;
                }
                response
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "network failed, trying cache");
                match self.caches().match_request(request).await {
                    Some(cached) => cached,
                    None => offline_json_response(),
                }
            }
        }
    }

    /// Cached offline page, or the plain 503
    async fn offline_page(&self) -> Response {
        match self.config().resolve(&self.config().offline_page) {
            Ok(url) => {
                let request = Request::new(Method::Get, url);
                if let Some(page) = self.caches().match_request(&request).await {
                    return page;
                }
            }
            Err(e) => tracing::warn!(error = %e, "offline page path does not resolve"),
        }
        offline_text_response()
    }

    async fn store_in_background(&self, request: &Request, response: Response) {
        let caches = self.caches().clone();
        let cache_name = self.config().runtime_cache.clone();
        let request = request.clone();

        self.background()
            .spawn(async move {
                let cache = caches.open(&cache_name).await;
                match cache.put(&request, response).await {
                    Ok(()) => tracing::debug!(url = %request.url, cache = %cache_name, "cached response"),
                    Err(e) => tracing::warn!(url = %request.url, cache = %cache_name, error = %e, "failed to cache response"),
                }
            })
            .await;
    }
}
