//! Soft-delete lifecycle shared by topics and articles.

use serde::{Deserialize, Serialize};

/// Record lifecycle state.
///
/// Stored as a nullable `deleted_at` column; `Deleted` carries the epoch-ms
/// timestamp at which the record was soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Lifecycle {
    Active,
    Deleted { at: i64 },
}

impl Lifecycle {
    /// Maps the persisted `deleted_at` column to a lifecycle state.
    pub fn from_deleted_at(deleted_at: Option<i64>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(at) => Self::Deleted { at },
        }
    }

    /// Inverse of [`Lifecycle::from_deleted_at`].
    pub fn deleted_at(self) -> Option<i64> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(at),
        }
    }

    /// Whether the record takes part in any read operation.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Active)
    }
}
