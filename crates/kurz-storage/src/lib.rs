//! Durable store adapters for URL mappings.

pub mod memory;
pub mod mysql;

pub use kurz_core::{ReadRepository, Repository, StorageError, UrlMapping};
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
