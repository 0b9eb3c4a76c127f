//! Error types for cddm operations.

use crate::domain::EntityKind;
use std::io;
use thiserror::Error;

/// The error type for cddm operations.
///
/// Dangling foreign keys are deliberately absent from this taxonomy: a
/// deleted department or task that is still referenced resolves to a
/// fallback display value instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    /// Update or delete targeted a record that does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of the missing record
        kind: EntityKind,
        /// Raw id that was looked up
        id: u64,
    },

    /// A dependency would link a task to itself.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A committed field value violates a record invariant.
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: EntityKind, id: u64) -> Self {
        Self::NotFound { kind, id }
    }
}

/// A specialized Result type for cddm operations.
pub type Result<T> = std::result::Result<T, Error>;
