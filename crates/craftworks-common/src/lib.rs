//! # Craftworks Common
//!
//! Common types and shared abstractions for Craftworks.
//!
//! This crate provides foundational types used across all Craftworks crates:
//! - Namespaced identities for recipes, tags and items
//! - Permission identifiers
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;
