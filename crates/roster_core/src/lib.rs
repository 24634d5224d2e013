//! Identity-mapped SQLite records for organizational units, staff members and
//! performance reviews.
//!
//! References (unit → member → review) are checked in application code with
//! point lookups; SQLite's own foreign-key engine is not used.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::RosterConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{Member, MemberId};
pub use model::review::{Review, ReviewId};
pub use model::unit::{Unit, UnitId};
pub use model::{FieldViolation, InvalidFieldError, MIN_REVIEW_YEAR};
pub use repo::member_repo::{MemberRef, MemberRepository};
pub use repo::review_repo::{ReviewRef, ReviewRepository};
pub use repo::unit_repo::{UnitRef, UnitRepository};
pub use repo::{ChildLister, IdentityMap, ReferenceCheck, RepoError, RepoResult, Shared};
pub use service::roster::Roster;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
