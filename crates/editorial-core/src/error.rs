//! Error types for editorial operations
//!
//! The authorization policy never fails: it answers `true` or `false`.
//! Everything that mutates state returns [`EditorialError`], which callers
//! translate into user-visible responses.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::article::ArticleStatus;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Validation messages keyed by input field.
///
/// # Examples
///
/// ```
/// use editorial_core::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.add("rubrik_id", "The selected rubrik does not exist.");
/// assert!(errors.has("rubrik_id"));
/// assert!(errors.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Create an empty error bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error bag holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Check if a field has any messages.
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fields with at least one message, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Check if no field failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when empty, otherwise [`EditorialError::ValidationFailed`].
    pub fn into_result(self) -> EditorialResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EditorialError::ValidationFailed(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Editorial error types.
#[derive(Debug, Error)]
pub enum EditorialError {
    /// The policy denied the action; nothing was attempted.
    #[error("Unauthorized: not allowed to {action}")]
    Unauthorized {
        /// The denied action (e.g. "approve", "assignRole")
        action: String,
    },

    /// The article is not in a status the action starts from.
    #[error("Invalid transition: cannot {action} an article in status {from}")]
    InvalidTransition {
        /// Transition label
        action: String,
        /// Status the article was in
        from: ArticleStatus,
    },

    /// One or more inputs were rejected.
    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record ("article", "user", ...)
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for editorial operations.
pub type EditorialResult<T> = Result<T, EditorialError>;

impl EditorialError {
    /// Shorthand for an [`EditorialError::Unauthorized`].
    pub fn unauthorized(action: impl fmt::Display) -> Self {
        EditorialError::Unauthorized {
            action: action.to_string(),
        }
    }

    /// Shorthand for an [`EditorialError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        EditorialError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Denials and validation failures are expected outcomes.
    pub fn is_server_error(&self) -> bool {
        matches!(self, EditorialError::Store(_) | EditorialError::Config(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            EditorialError::Unauthorized { .. } => 403,
            EditorialError::InvalidTransition { .. } => 409,
            EditorialError::ValidationFailed(_) => 422,
            EditorialError::NotFound { .. } => 404,
            EditorialError::Store(_) | EditorialError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            EditorialError::Unauthorized { .. } => "UNAUTHORIZED",
            EditorialError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EditorialError::ValidationFailed(_) => "VALIDATION_FAILED",
            EditorialError::NotFound { .. } => "NOT_FOUND",
            EditorialError::Store(_) => "STORAGE_ERROR",
            EditorialError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            EditorialError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}
