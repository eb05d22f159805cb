//! Domain model for tenants, topics and articles.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Provide one lifecycle helper reused by tree assembly and search.
//!
//! # Invariants
//! - Every topic/article belongs to exactly one tenant.
//! - Deletion is represented by soft-delete timestamps, not hard delete.

pub mod article;
pub mod lifecycle;
pub mod tenant;
pub mod topic;

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Validation failures for caller-provided write input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Text field exceeds its maximum length in characters.
    TooLong { field: &'static str, max_chars: usize },
    /// Visibility text is not `public` or `private`.
    UnknownVisibility(String),
    /// Topic cannot be its own parent.
    SelfParent(Uuid),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::UnknownVisibility(value) => {
                write!(f, "unknown visibility `{value}`; expected public|private")
            }
            Self::SelfParent(id) => write!(f, "topic {id} cannot be its own parent"),
        }
    }
}

impl Error for ValidationError {}

/// Malformed identifier supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdError {
    pub field: &'static str,
    pub value: String,
}

impl Display for InvalidIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`", self.field, self.value)
    }
}

impl Error for InvalidIdError {}

/// Parses a caller-supplied identifier in the datastore's native id format.
pub fn parse_id(value: &str, field: &'static str) -> Result<Uuid, InvalidIdError> {
    Uuid::parse_str(value.trim()).map_err(|_| InvalidIdError {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn normalize_required_text(
    value: &str,
    field: &'static str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    if trimmed.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(trimmed.to_string())
}
