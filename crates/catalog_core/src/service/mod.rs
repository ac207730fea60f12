//! Core use-case services.
//!
//! # Responsibility
//! - Own catalog state and orchestrate validation and persistence.
//! - Keep shells decoupled from storage details.

pub mod entry_store;
