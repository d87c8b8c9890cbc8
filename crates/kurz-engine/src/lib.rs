//! Short-code resolution engine.
//!
//! [`ResolutionEngine`] creates short codes for URLs (deduplicating against
//! the store) and resolves codes back through a cache-aside read path.

pub mod engine;
pub mod error;
pub mod resolver;

pub use engine::{EngineSettings, ResolutionEngine};
pub use error::{EngineError, Result};
pub use resolver::{LookupSource, Resolved, StoreLookup, UrlResolver};
