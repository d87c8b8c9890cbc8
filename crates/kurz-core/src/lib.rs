//! Core types and traits for the kurz URL shortener.
//!
//! This crate provides the short code type, the base62 encoder and the
//! contracts that storage and cache adapters implement for the
//! resolution engine.

pub mod base62;
pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, StorageError};
pub use repository::{ReadRepository, Repository, UrlMapping};
pub use shortcode::ShortCode;
