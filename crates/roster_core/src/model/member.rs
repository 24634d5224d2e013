//! Staff member record.
//!
//! # Invariants
//! - `name` and `job_title` are never blank.
//! - `unit_id` is only changed through the repository, which checks that the
//!   referenced unit exists before assigning it.

use super::unit::UnitId;
use super::{require_text, InvalidFieldError};
use serde::Serialize;

/// Store-assigned identity of a member row.
pub type MemberId = i64;

const ENTITY: &str = "member";

/// Staff member (stored in `members`) belonging to exactly one unit.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Member {
    id: Option<MemberId>,
    name: String,
    job_title: String,
    unit_id: UnitId,
}

impl Member {
    /// Creates an unsaved member.
    ///
    /// Only the text fields are validated here. `unit_id` is checked against
    /// the unit store by `MemberRepository::create`/`save`.
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
        unit_id: UnitId,
    ) -> Result<Self, InvalidFieldError> {
        Ok(Self {
            id: None,
            name: require_text(ENTITY, "name", name)?,
            job_title: require_text(ENTITY, "job_title", job_title)?,
            unit_id,
        })
    }

    pub(crate) fn with_id(
        id: MemberId,
        name: impl Into<String>,
        job_title: impl Into<String>,
        unit_id: UnitId,
    ) -> Result<Self, InvalidFieldError> {
        let mut member = Self::new(name, job_title, unit_id)?;
        member.id = Some(id);
        Ok(member)
    }

    pub fn id(&self) -> Option<MemberId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), InvalidFieldError> {
        self.name = require_text(ENTITY, "name", name)?;
        Ok(())
    }

    pub fn set_job_title(&mut self, job_title: impl Into<String>) -> Result<(), InvalidFieldError> {
        self.job_title = require_text(ENTITY, "job_title", job_title)?;
        Ok(())
    }

    pub(crate) fn set_unit_id(&mut self, unit_id: UnitId) {
        self.unit_id = unit_id;
    }

    pub(crate) fn set_id(&mut self, id: Option<MemberId>) {
        self.id = id;
    }
}
