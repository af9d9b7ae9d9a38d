//! Error types for Herd.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Most "failures" in a collection store are not errors at all: missing
//! entities resolve to `None` and no-op mutations are ignored. What remains
//! is modelled here.

use std::fmt;

use thiserror::Error;

/// The main error type for Herd operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a "no active entity" error.
    #[must_use]
    pub fn no_active_entity() -> Self {
        Self::new(ErrorKind::NoActiveEntity)
    }

    /// Returns true if this is a "no active entity" error.
    #[must_use]
    pub fn is_no_active_entity(&self) -> bool {
        matches!(self.kind, ErrorKind::NoActiveEntity)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// An active-entity view was requested while no entity is active.
    #[error("no active entity: set an active id before selecting the active entity")]
    NoActiveEntity,

    /// An integer does not fit the id range.
    #[error("id out of range: {0}")]
    IdOutOfRange(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Name of the store involved.
    pub store: Option<String>,
    /// Operation that raised the error.
    pub operation: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store name.
    #[must_use]
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.operation, &self.store) {
            (Some(op), Some(store)) => write!(f, "in {op} on store {store}"),
            (Some(op), None) => write!(f, "in {op}"),
            (None, Some(store)) => write!(f, "on store {store}"),
            (None, None) => Ok(()),
        }
    }
}

/// Result type alias for Herd operations.
pub type Result<T> = std::result::Result<T, Error>;
