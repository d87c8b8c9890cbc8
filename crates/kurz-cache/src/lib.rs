//! Cache layer and cache adapters for the kurz resolution engine.
//!
//! [`CacheLayer`] wraps any [`UrlCache`] adapter and turns its failures into
//! misses, so the engine never fails because the cache did.

pub mod layer;
pub mod layered;
pub mod moka;
pub mod redis;

pub use kurz_core::{CacheError, UrlCache};
pub use layer::{CacheLayer, CacheSettings, CacheStats, DEFAULT_TTL};
pub use layered::LayeredCache;
pub use moka::MokaUrlCache;
pub use redis::RedisUrlCache;
