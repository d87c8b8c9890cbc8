use std::sync::Arc;

use kurz_engine::UrlResolver;

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<dyn UrlResolver>,
    base_url: Arc<str>,
}

impl AppState {
    pub fn new(resolver: Arc<dyn UrlResolver>, public_base_url: impl Into<String>) -> Self {
        Self {
            resolver,
            base_url: public_base_url.into().into(),
        }
    }

    pub fn resolver(&self) -> &dyn UrlResolver {
        self.resolver.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
