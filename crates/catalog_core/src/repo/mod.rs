//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the whole-collection load/save contract used by the store.
//! - Isolate document format and file write strategy from store logic.
//!
//! # Invariants
//! - Repositories never validate or reorder entries; they persist exactly
//!   what the store hands them.

pub mod entry_repo;
