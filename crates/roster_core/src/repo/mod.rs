//! Repository layer: identity-mapped persistence for roster records.
//!
//! # Responsibility
//! - Keep one canonical in-memory instance per stored row (identity map).
//! - Enforce unit → member → review references in application code.
//! - Isolate SQL details from the facade and callers.
//!
//! # Invariants
//! - Materializing a row whose identity is already mapped returns the cached
//!   instance unchanged ("cached instance wins") in every repository.
//! - Reference checks are point lookups against the store, never the map.
//! - Parent deletes never cascade to children.

use crate::db::DbError;
use crate::model::InvalidFieldError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod identity_map;
pub mod member_repo;
pub mod review_repo;
pub mod unit_repo;

pub use identity_map::{IdentityMap, Shared};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for roster persistence and reference checks.
#[derive(Debug)]
pub enum RepoError {
    /// A field failed format validation before any store access.
    InvalidField(InvalidFieldError),
    /// A reference field points at a parent row that does not exist.
    DanglingReference { field: &'static str, id: i64 },
    /// `update` was called on a record that has never been saved.
    MissingIdentity(&'static str),
    /// An update matched no stored row.
    NotFound { entity: &'static str, id: i64 },
    /// A stored row could not be materialized into a valid record.
    InvalidData(String),
    /// A child lister was never attached, or has been dropped.
    Unwired(&'static str),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField(err) => write!(f, "{err}"),
            Self::DanglingReference { field, id } => {
                write!(f, "{field} {id} does not reference an existing row")
            }
            Self::MissingIdentity(entity) => {
                write!(f, "cannot update {entity} without an id; save it first")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Unwired(collaborator) => {
                write!(f, "{collaborator} repository is not attached")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidField(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidFieldError> for RepoError {
    fn from(value: InvalidFieldError) -> Self {
        Self::InvalidField(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store-backed existence check used to validate reference fields.
pub trait ReferenceCheck {
    /// Returns whether a row with `id` currently exists in the store.
    fn exists(&self, id: i64) -> RepoResult<bool>;
}

/// Materializes the children of one parent row.
///
/// Parents hold this as a `Weak` trait object so that the unit and member
/// repositories never need each other's concrete types.
pub trait ChildLister<Child> {
    fn list_by_parent(&self, parent_id: i64) -> RepoResult<Vec<Shared<Child>>>;
}

/// Maps a row-level validation failure to `InvalidData` with table context.
pub(crate) fn invalid_row(table: &str, id: i64, err: InvalidFieldError) -> RepoError {
    RepoError::InvalidData(format!("{table} row {id}: {err}"))
}
