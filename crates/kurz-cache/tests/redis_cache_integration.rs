use std::time::Duration;

use kurz_cache::{CacheLayer, RedisUrlCache};
use kurz_core::{ShortCode, UrlCache};
use kurz_test_infra::redis::RedisServer;
use redis::AsyncCommands;

/// Test fixture that manages a Redis container using test-infra.
struct RedisTestContainer {
    _redis: RedisServer,
    redis_url: String,
}

impl RedisTestContainer {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let redis_url = redis.redis_url().await.expect("redis url");
        Self {
            _redis: redis,
            redis_url,
        }
    }

    async fn cache(&self) -> RedisUrlCache {
        RedisUrlCache::connect(&self.redis_url)
            .await
            .expect("connect redis cache")
    }

    async fn raw_connection(&self) -> redis::aio::MultiplexedConnection {
        redis::Client::open(self.redis_url.as_str())
            .expect("redis client")
            .get_multiplexed_async_connection()
            .await
            .expect("redis connection")
    }
}

fn code(s: &str) -> ShortCode {
    ShortCode::new(s).unwrap()
}

#[tokio::test]
async fn set_then_get_returns_original_url() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;
    let c = code("BFp3qQ");

    assert!(cache.get_url(&c).await.unwrap().is_none());

    cache
        .set_url(&c, "https://example.com/a", Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        cache.get_url(&c).await.unwrap().as_deref(),
        Some("https://example.com/a")
    );
}

#[tokio::test]
async fn entries_are_stored_under_prefix_with_expiry() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;
    let c = code("BFp3qR");

    cache
        .set_url(&c, "https://example.com/b", Duration::from_secs(900))
        .await
        .unwrap();

    let mut conn = fixture.raw_connection().await;
    let raw: Option<String> = conn.get("url:BFp3qR").await.unwrap();
    assert_eq!(raw.as_deref(), Some("https://example.com/b"));

    let ttl: i64 = conn.ttl("url:BFp3qR").await.unwrap();
    assert!(ttl > 0 && ttl <= 900, "unexpected ttl {ttl}");
}

#[tokio::test]
async fn entry_expires() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;
    let c = code("BFp3qS");

    cache
        .set_url(&c, "https://example.com/c", Duration::from_secs(1))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert!(cache.get_url(&c).await.unwrap().is_none());
}

#[tokio::test]
async fn del_removes_entry() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;
    let c = code("BFp3qT");

    cache
        .set_url(&c, "https://example.com/d", Duration::from_secs(60))
        .await
        .unwrap();
    cache.del(&c).await.unwrap();
    // deleting again is fine
    cache.del(&c).await.unwrap();

    assert!(cache.get_url(&c).await.unwrap().is_none());
}

#[tokio::test]
async fn layer_over_redis_round_trips() {
    let fixture = RedisTestContainer::start().await;
    let layer = CacheLayer::new(fixture.cache().await);
    let c = code("BFp3qU");

    layer.put(&c, "https://example.com/e").await;

    assert_eq!(layer.get(&c).await.as_deref(), Some("https://example.com/e"));
    assert_eq!(layer.stats().errors, 0);
}
