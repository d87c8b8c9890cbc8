use std::sync::Arc;

use anyhow::Context;
use kurz_allocator::MonotonicAllocator;
use kurz_cache::{CacheLayer, CacheSettings, LayeredCache, MokaUrlCache, RedisUrlCache};
use kurz_core::{Repository, UrlCache};
use kurz_engine::{EngineSettings, ResolutionEngine, UrlResolver};
use kurz_storage::{InMemoryRepository, MySqlRepository};
use tracing::info;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};

/// Builds the resolution engine selected by the command line.
pub async fn build_resolver(config: &CLI) -> anyhow::Result<Arc<dyn UrlResolver>> {
    let repository = build_repository(config).await?;
    let cache = build_cache(config).await?;

    let mut cache_settings = CacheSettings::builder().ttl(config.cache_ttl()).build();
    cache_settings.timeout = config.cache_timeout();
    let engine_settings = EngineSettings {
        store_timeout: config.store_timeout(),
    };

    let engine = ResolutionEngine::with_settings(
        repository,
        CacheLayer::with_settings(cache, cache_settings),
        MonotonicAllocator::new(),
        engine_settings,
    );
    Ok(Arc::new(engine))
}

async fn build_repository(config: &CLI) -> anyhow::Result<Arc<dyn Repository>> {
    match config.storage {
        StorageBackendArg::InMemory => Ok(Arc::new(InMemoryRepository::new())),
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(dsn)
                .await
                .context("failed to connect to mysql")?;
            repository
                .ensure_schema()
                .await
                .context("failed to create url_mappings schema")?;
            info!("connected to mysql");
            Ok(Arc::new(repository))
        }
    }
}

async fn build_cache(config: &CLI) -> anyhow::Result<Arc<dyn UrlCache>> {
    let moka = || MokaUrlCache::with_capacity(config.cache_capacity);

    match config.cache {
        CacheBackendArg::Moka => Ok(Arc::new(moka())),
        CacheBackendArg::Redis => Ok(Arc::new(connect_redis(config).await?)),
        CacheBackendArg::Layered => {
            let redis = connect_redis(config).await?;
            Ok(Arc::new(LayeredCache::new(moka(), redis, config.cache_ttl())))
        }
    }
}

async fn connect_redis(config: &CLI) -> anyhow::Result<RedisUrlCache> {
    let redis_url = config
        .redis_url
        .as_deref()
        .context("redis url is required for the selected cache backend")?;
    let cache = RedisUrlCache::connect(redis_url)
        .await
        .context("failed to connect to redis")?;
    info!("connected to redis");
    Ok(cache)
}
