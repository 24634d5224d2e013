//! Performance review record.

use super::member::MemberId;
use super::{require_at_least, require_text, InvalidFieldError, MIN_REVIEW_YEAR};
use serde::Serialize;

/// Store-assigned identity of a review row.
pub type ReviewId = i64;

const ENTITY: &str = "review";

/// Performance review (stored in `reviews`) written for one member.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<ReviewId>,
    year: i32,
    summary: String,
    member_id: MemberId,
}

impl Review {
    /// Creates an unsaved review. `year` must be `MIN_REVIEW_YEAR` or later.
    pub fn new(
        year: i32,
        summary: impl Into<String>,
        member_id: MemberId,
    ) -> Result<Self, InvalidFieldError> {
        Ok(Self {
            id: None,
            year: require_at_least(ENTITY, "year", year, MIN_REVIEW_YEAR)?,
            summary: require_text(ENTITY, "summary", summary)?,
            member_id,
        })
    }

    pub(crate) fn with_id(
        id: ReviewId,
        year: i32,
        summary: impl Into<String>,
        member_id: MemberId,
    ) -> Result<Self, InvalidFieldError> {
        let mut review = Self::new(year, summary, member_id)?;
        review.id = Some(id);
        Ok(review)
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn set_year(&mut self, year: i32) -> Result<(), InvalidFieldError> {
        self.year = require_at_least(ENTITY, "year", year, MIN_REVIEW_YEAR)?;
        Ok(())
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), InvalidFieldError> {
        self.summary = require_text(ENTITY, "summary", summary)?;
        Ok(())
    }

    pub(crate) fn set_member_id(&mut self, member_id: MemberId) {
        self.member_id = member_id;
    }

    pub(crate) fn set_id(&mut self, id: Option<ReviewId>) {
        self.id = id;
    }
}
