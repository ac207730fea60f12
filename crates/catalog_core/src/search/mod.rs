//! Entry search entry points.
//!
//! # Responsibility
//! - Provide case-insensitive substring filtering over the entry collection.
//!
//! # Invariants
//! - Search never mutates entries and preserves collection order.

pub mod substring;
