//! Record models for units, members and reviews.
//!
//! # Responsibility
//! - Define the three record shapes persisted by the repository layer.
//! - Own pure field validation (format and non-emptiness only).
//!
//! # Invariants
//! - Text fields are non-empty after trimming; stored values are kept as given.
//! - Identity is `None` until the repository assigns one on first save.
//! - Setters never commit a partial mutation: on error the prior value stays.
//! - Reference existence is NOT checked here; see `repo::member_repo` and
//!   `repo::review_repo` for store-backed checks.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod member;
pub mod review;
pub mod unit;

/// Minimum accepted review year.
pub const MIN_REVIEW_YEAR: i32 = 2000;

/// Why a field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldViolation {
    /// Empty or whitespace-only text.
    Blank,
    /// Integer below the accepted lower bound.
    BelowMinimum { minimum: i64, actual: i64 },
}

/// Field-level validation failure raised at construction or assignment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidFieldError {
    pub entity: &'static str,
    pub field: &'static str,
    pub violation: FieldViolation,
}

impl Display for InvalidFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.violation {
            FieldViolation::Blank => write!(
                f,
                "{}.{} must be a non-empty string",
                self.entity, self.field
            ),
            FieldViolation::BelowMinimum { minimum, actual } => write!(
                f,
                "{}.{} must be {minimum} or later, got {actual}",
                self.entity, self.field
            ),
        }
    }
}

impl Error for InvalidFieldError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: impl Into<String>,
) -> Result<String, InvalidFieldError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(InvalidFieldError {
            entity,
            field,
            violation: FieldViolation::Blank,
        });
    }
    Ok(value)
}

pub(crate) fn require_at_least(
    entity: &'static str,
    field: &'static str,
    value: i32,
    minimum: i32,
) -> Result<i32, InvalidFieldError> {
    if value < minimum {
        return Err(InvalidFieldError {
            entity,
            field,
            violation: FieldViolation::BelowMinimum {
                minimum: i64::from(minimum),
                actual: i64::from(value),
            },
        });
    }
    Ok(value)
}
