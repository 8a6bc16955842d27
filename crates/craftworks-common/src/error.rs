//! Error types shared by the Craftworks crates.

use thiserror::Error;

/// Top-level error type for Craftworks operations.
#[derive(Debug, Error)]
pub enum CraftworksError {
    /// Malformed identity string
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    /// Malformed recipe document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors produced while parsing a [`crate::NamespacedKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Input was empty or whitespace
    #[error("key cannot be empty")]
    Empty,

    /// Namespace part was empty
    #[error("key namespace cannot be empty")]
    EmptyNamespace,

    /// Key part was empty
    #[error("key path cannot be empty")]
    EmptyKey,

    /// A part exceeded its length limit
    #[error("key {part} too long (max {max})")]
    TooLong {
        /// Which part ("namespace" or "key")
        part: &'static str,
        /// Maximum accepted length
        max: usize,
    },

    /// A part contained a character outside the allowed set
    #[error("key {part} has invalid character '{character}'")]
    InvalidCharacter {
        /// Which part ("namespace" or "key")
        part: &'static str,
        /// Offending character
        character: char,
    },
}

/// A raw recipe document is missing a required field or holds an ill-typed one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    /// Required field absent
    #[error("missing required field '{field}'")]
    MissingField {
        /// Field path
        field: String,
    },

    /// Field present with the wrong type
    #[error("field '{field}' must be {expected}, found {found}")]
    WrongType {
        /// Field path
        field: String,
        /// Expected node type
        expected: &'static str,
        /// Node type actually found
        found: &'static str,
    },

    /// Field well-typed but semantically invalid
    #[error("field '{field}' is invalid: {reason}")]
    InvalidValue {
        /// Field path
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Field holds a string that is not a valid namespaced key
    #[error("field '{field}' holds an invalid key: {source}")]
    InvalidKey {
        /// Field path
        field: String,
        /// Underlying key error
        #[source]
        source: KeyError,
    },
}

impl DocumentError {
    /// Shorthand for [`DocumentError::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Shorthand for [`DocumentError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Path of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::WrongType { field, .. }
            | Self::InvalidValue { field, .. }
            | Self::InvalidKey { field, .. } => field,
        }
    }
}

/// Result type alias for Craftworks operations.
pub type CraftworksResult<T> = Result<T, CraftworksError>;
