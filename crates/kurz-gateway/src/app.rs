use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    baseline_redirect_handler, cache_stats_handler, create_url_handler, evict_cache_handler,
    health_handler, indexed_redirect_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/api/v1",
                Router::new()
                    .route("/urls", post(create_url_handler))
                    .route("/urls/{short_code}", get(redirect_handler))
                    .route("/urls/indexed/{short_code}", get(indexed_redirect_handler))
                    .route("/urls/baseline/{short_code}", get(baseline_redirect_handler))
                    .route("/urls/{short_code}/cache", delete(evict_cache_handler))
                    .route("/cache/stats", get(cache_stats_handler)),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::LOOKUP_SOURCE_HEADER;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, LOCATION};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use kurz_allocator::SeqAllocator;
    use kurz_cache::{CacheLayer, CacheStats, MokaUrlCache};
    use kurz_core::{ShortCode, StorageError};
    use kurz_engine::{EngineError, ResolutionEngine, Resolved, StoreLookup, UrlResolver};
    use kurz_storage::InMemoryRepository;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BASE_URL: &str = "http://kurz.test/api/v1/urls";

    fn test_router() -> Router {
        let engine = ResolutionEngine::new(
            InMemoryRepository::new(),
            CacheLayer::new(MokaUrlCache::new()),
            SeqAllocator::new(),
        );
        App::router(AppState::new(Arc::new(engine), BASE_URL))
    }

    /// Resolver whose store is down.
    struct UnavailableResolver;

    #[async_trait]
    impl UrlResolver for UnavailableResolver {
        async fn create_short_url(&self, _original_url: &str) -> kurz_engine::Result<ShortCode> {
            Err(EngineError::StoreUnavailable(StorageError::Unavailable("down".into())))
        }

        async fn resolve(&self, _code: &ShortCode) -> kurz_engine::Result<Resolved> {
            Err(EngineError::StoreUnavailable(StorageError::Unavailable("down".into())))
        }

        async fn resolve_via_store_only(
            &self,
            _code: &ShortCode,
            _lookup: StoreLookup,
        ) -> kurz_engine::Result<Resolved> {
            Err(EngineError::StoreUnavailable(StorageError::Timeout("slow".into())))
        }

        async fn evict(&self, _code: &ShortCode) {}

        fn cache_stats(&self) -> CacheStats {
            CacheStats::default()
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_request(original_url: &str) -> Request<Body> {
        Request::post("/api/v1/urls")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "original_url": original_url }).to_string(),
            ))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = send(&test_router(), get("/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn create_returns_code_and_short_url() {
        let response = send(&test_router(), create_request("https://example.com/a")).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["short_code"], "BFp3qQ");
        assert_eq!(body["short_url"], "http://kurz.test/api/v1/urls/BFp3qQ");
        assert_eq!(body["original_url"], "https://example.com/a");
    }

    #[tokio::test]
    async fn create_is_idempotent_over_http() {
        let router = test_router();

        let first = json_body(send(&router, create_request("https://example.com/a")).await).await;
        let second = json_body(send(&router, create_request("https://example.com/a")).await).await;

        assert_eq!(first["short_code"], second["short_code"]);
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let response = send(&test_router(), create_request("   ")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn redirect_goes_through_the_cache() {
        let router = test_router();
        send(&router, create_request("https://example.com/a")).await;

        let first = send(&router, get("/api/v1/urls/BFp3qQ")).await;
        assert_eq!(first.status(), StatusCode::FOUND);
        assert_eq!(first.headers()[LOCATION], "https://example.com/a");
        assert_eq!(first.headers()[LOOKUP_SOURCE_HEADER], "store");

        let second = send(&router, get("/api/v1/urls/BFp3qQ")).await;
        assert_eq!(second.headers()[LOOKUP_SOURCE_HEADER], "cache");

        let stats = json_body(send(&router, get("/api/v1/cache/stats")).await).await;
        assert_eq!(stats["hits"], 1);
        assert_eq!(stats["misses"], 1);
        assert_eq!(stats["hit_rate"], 0.5);
    }

    #[tokio::test]
    async fn store_only_routes_skip_the_cache() {
        let router = test_router();
        send(&router, create_request("https://example.com/a")).await;

        let indexed = send(&router, get("/api/v1/urls/indexed/BFp3qQ")).await;
        let baseline = send(&router, get("/api/v1/urls/baseline/BFp3qQ")).await;

        assert_eq!(indexed.status(), StatusCode::FOUND);
        assert_eq!(indexed.headers()[LOOKUP_SOURCE_HEADER], "store");
        assert_eq!(baseline.status(), StatusCode::FOUND);
        assert_eq!(baseline.headers()[LOOKUP_SOURCE_HEADER], "store_unindexed");
        assert_eq!(baseline.headers()[LOCATION], "https://example.com/a");

        let stats = json_body(send(&router, get("/api/v1/cache/stats")).await).await;
        assert_eq!(stats["hits"], 0);
        assert_eq!(stats["misses"], 0);
    }

    #[tokio::test]
    async fn unknown_and_malformed_codes_are_not_found() {
        let router = test_router();

        for uri in [
            "/api/v1/urls/ZZZZZ",
            "/api/v1/urls/not-a-code!",
            "/api/v1/urls/indexed/ZZZZZ",
            "/api/v1/urls/baseline/ZZZZZ",
        ] {
            let response = send(&router, get(uri)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn evict_drops_the_cached_entry() {
        let router = test_router();
        send(&router, create_request("https://example.com/a")).await;
        send(&router, get("/api/v1/urls/BFp3qQ")).await;

        let evicted = send(
            &router,
            Request::delete("/api/v1/urls/BFp3qQ/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(evicted.status(), StatusCode::NO_CONTENT);

        let after = send(&router, get("/api/v1/urls/BFp3qQ")).await;
        assert_eq!(after.headers()[LOOKUP_SOURCE_HEADER], "store");
    }

    #[tokio::test]
    async fn url_that_cannot_be_a_location_is_a_server_error() {
        let router = test_router();
        let created = send(&router, create_request("https://example.com/a\nb")).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let response = send(&router, get("/api/v1/urls/BFp3qQ")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(LOCATION).is_none());
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "error": "internal server error" })
        );
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let router = App::router(AppState::new(Arc::new(UnavailableResolver), BASE_URL));

        let create = send(&router, create_request("https://example.com/a")).await;
        let redirect = send(&router, get("/api/v1/urls/BFp3qQ")).await;
        let baseline = send(&router, get("/api/v1/urls/baseline/BFp3qQ")).await;

        assert_eq!(create.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(redirect.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(baseline.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
