//! # Craftworks Loader
//!
//! Turns already-parsed recipe documents into typed recipes.
//!
//! This crate provides:
//! - [`RecipeLoader`]: kind dispatch, materialization and the validation policy
//! - [`RecipeBook`]: loaded recipes indexed by key, kind and container
//! - [`LoaderConfig`]: loader policy parsed from TOML
//! - [`LoaderStats`]: per-cause counters for skipped documents

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod book;
pub mod config;
pub mod loader;

pub use book::RecipeBook;
pub use config::LoaderConfig;
pub use loader::{LoadError, LoadResult, LoaderStats, RecipeLoader};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::book::*;
    pub use crate::config::*;
    pub use crate::loader::*;
}
