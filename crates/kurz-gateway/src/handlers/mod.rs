mod cache;
mod health;
mod url;

pub use cache::{cache_stats_handler, evict_cache_handler};
pub use health::health_handler;
pub use url::{
    baseline_redirect_handler, create_url_handler, indexed_redirect_handler, redirect_handler,
    LOOKUP_SOURCE_HEADER,
};
