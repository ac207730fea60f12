//! Catalog domain model.
//!
//! # Responsibility
//! - Define the entry record held by the store and written to disk.
//! - Provide field-level validation helpers shared by store write paths.
//!
//! # Invariants
//! - Every entry in memory carries a stable `EntryId` for its lifetime.
//! - The persisted shape is exactly `name`, `description`, `website`.

pub mod entry;
