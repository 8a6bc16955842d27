//! Error types for the recipe registry and recipe materialization.

use craftworks_common::{DocumentError, NamespacedKey};
use thiserror::Error;

use crate::family::RecipeFamily;

/// Catalog bootstrap errors.
///
/// Every variant signals a defect in how the catalog was authored. Bootstrap
/// is fail-fast: the first error aborts startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A kind for this family tag is already registered
    #[error("Duplicate recipe kind: {0}")]
    DuplicateKind(RecipeFamily),

    /// A container names a member kind that was never registered
    #[error("Container '{container}' references unregistered kind {family}")]
    UnknownKind {
        /// Container being registered
        container: String,
        /// Missing member
        family: RecipeFamily,
    },

    /// A container was declared without members
    #[error("Container '{0}' has no member kinds")]
    EmptyContainer(String),

    /// A kind can belong to at most one container
    #[error("Kind {family} already belongs to container '{container}'")]
    KindAlreadyContained {
        /// Kind being re-attached
        family: RecipeFamily,
        /// Container that already owns it
        container: String,
    },

    /// A dispatching container needs one member per discriminator value
    #[error("Container '{container}' dispatches between two members but has {members}")]
    DispatchArity {
        /// Container being registered
        container: String,
        /// Number of members it declared
        members: usize,
    },

    /// The process-wide registry handle was already initialized
    #[error("Recipe registry is already installed")]
    AlreadyInstalled,
}

/// Errors raised while materializing a recipe from a raw document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecipeError {
    /// Required field absent or ill-typed
    #[error("Malformed recipe document: {0}")]
    MalformedDocument(#[from] DocumentError),

    /// The implementation type cannot construct this kind
    #[error("Failed to instantiate {kind}: {reason}")]
    InstantiationFailure {
        /// Kind id
        kind: String,
        /// What went wrong
        reason: String,
    },

    /// Container has no rule to pick a member from a document
    #[error("Container '{0}' cannot choose a member kind from a document")]
    NoDispatchRule(String),

    /// No kind or container is registered under this id
    #[error("Unknown recipe kind: {0}")]
    UnknownKind(String),
}

/// A recipe did not satisfy the type it was narrowed to.
///
/// Always a caller bug: `is_instance` must be checked before casting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot cast {found} recipe '{key}' to {target}")]
pub struct CastError {
    /// Recipe being cast
    pub key: NamespacedKey,
    /// Its actual family
    pub found: RecipeFamily,
    /// Name of the requested type
    pub target: &'static str,
}

/// Result type for catalog bootstrap.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for recipe materialization.
pub type RecipeResult<T> = Result<T, RecipeError>;
