//! Core domain logic for the plugin catalog.
//! This crate is the single source of truth for entry invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::entry::{Entry, EntryField, EntryId, WEBSITE_PREFIX};
pub use repo::entry_repo::{
    EntryRepository, JsonFileEntryRepository, MemoryEntryRepository, RepoError, RepoResult,
    DEFAULT_FILE_NAME,
};
pub use search::substring::{filter_entries, filter_positions};
pub use service::entry_store::{
    EntryStore, StoreConfig, StoreError, StoreResult, UpdateValidation,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
