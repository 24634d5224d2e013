//! Review repository: identity-mapped CRUD over `reviews`.
//!
//! # Invariants
//! - Every write runs `check_member` first.
//! - Rows already present in the identity map are never refreshed from the
//!   store; the live instance is returned as-is.

use super::{invalid_row, ChildLister, IdentityMap, ReferenceCheck, RepoError, RepoResult, Shared};
use crate::model::member::MemberId;
use crate::model::review::{Review, ReviewId};
use log::{debug, info, warn};
use rusqlite::{params, Connection, Params, Row};
use std::cell::RefCell;
use std::rc::Rc;

const REVIEW_SELECT_SQL: &str = "SELECT id, year, summary, employee_id FROM reviews";
const ENTITY: &str = "review";

/// Shared handle to the canonical in-memory review.
pub type ReviewRef = Shared<Review>;

/// SQLite-backed review repository with its own identity map.
pub struct ReviewRepository<'conn> {
    conn: &'conn Connection,
    map: IdentityMap<Review>,
    members: Rc<dyn ReferenceCheck + 'conn>,
}

impl<'conn> ReviewRepository<'conn> {
    /// Creates a repository whose `member_id` checks go through `members`.
    pub fn new(conn: &'conn Connection, members: Rc<dyn ReferenceCheck + 'conn>) -> Self {
        Self {
            conn,
            map: IdentityMap::new(ENTITY),
            members,
        }
    }

    pub fn identity_map(&self) -> &IdentityMap<Review> {
        &self.map
    }

    /// Fails with `DanglingReference` unless `member_id` exists in `members`.
    pub fn check_member(&self, member_id: MemberId) -> RepoResult<()> {
        if self.members.exists(member_id)? {
            return Ok(());
        }
        warn!("event=reference_check module=repo status=error entity=review field=member_id id={member_id}");
        Err(RepoError::DanglingReference {
            field: "review.member_id",
            id: member_id,
        })
    }

    /// Points `review` at another member after checking the member exists.
    pub fn assign_member(&self, review: &ReviewRef, member_id: MemberId) -> RepoResult<()> {
        self.check_member(member_id)?;
        review.borrow_mut().set_member_id(member_id);
        Ok(())
    }

    pub fn create(
        &self,
        year: i32,
        summary: impl Into<String>,
        member_id: MemberId,
    ) -> RepoResult<ReviewRef> {
        let review = Review::new(year, summary, member_id)?;
        self.check_member(member_id)?;
        let review = Rc::new(RefCell::new(review));
        self.insert(&review)?;
        Ok(review)
    }

    pub fn find_by_id(&self, id: ReviewId) -> RepoResult<Option<ReviewRef>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.materialize(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_all(&self) -> RepoResult<Vec<ReviewRef>> {
        self.find_many("1 = 1", [])
    }

    /// Returns the reviews written for `member_id`, ordered by id.
    pub fn list_for_member(&self, member_id: MemberId) -> RepoResult<Vec<ReviewRef>> {
        self.find_many("employee_id = ?1", [member_id])
    }

    /// Returns reviews whose member row no longer exists.
    pub fn list_orphans(&self) -> RepoResult<Vec<ReviewRef>> {
        self.find_many("employee_id NOT IN (SELECT id FROM members)", [])
    }

    pub fn save(&self, review: &ReviewRef) -> RepoResult<()> {
        let id = review.borrow().id();
        match id {
            None => {
                let member_id = review.borrow().member_id();
                self.check_member(member_id)?;
                self.insert(review)
            }
            Some(_) => self.update(review),
        }
    }

    pub fn update(&self, review: &ReviewRef) -> RepoResult<()> {
        let current = review.borrow();
        let id = current.id().ok_or(RepoError::MissingIdentity(ENTITY))?;
        self.check_member(current.member_id())?;
        let changed = self.conn.execute(
            "UPDATE reviews SET year = ?1, summary = ?2, employee_id = ?3 WHERE id = ?4;",
            params![current.year(), current.summary(), current.member_id(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        info!("event=record_update module=repo status=ok entity=review id={id}");
        Ok(())
    }

    pub fn delete(&self, review: &ReviewRef) -> RepoResult<()> {
        let id = review.borrow().id();
        let Some(id) = id else {
            debug!("event=record_delete module=repo status=skipped entity=review reason=unsaved");
            return Ok(());
        };
        let removed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
        self.map.evict(id);
        review.borrow_mut().set_id(None);
        info!("event=record_delete module=repo status=ok entity=review id={id} removed_rows={removed}");
        Ok(())
    }

    fn insert(&self, review: &ReviewRef) -> RepoResult<()> {
        let id = {
            let current = review.borrow();
            self.conn.execute(
                "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3);",
                params![current.year(), current.summary(), current.member_id()],
            )?;
            self.conn.last_insert_rowid()
        };
        review.borrow_mut().set_id(Some(id));
        self.map.register(id, Rc::clone(review));
        info!("event=record_insert module=repo status=ok entity=review id={id}");
        Ok(())
    }

    fn find_many(&self, predicate: &str, params: impl Params) -> RepoResult<Vec<ReviewRef>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REVIEW_SELECT_SQL} WHERE {predicate} ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(self.materialize(row)?);
        }
        Ok(reviews)
    }

    fn materialize(&self, row: &Row<'_>) -> RepoResult<ReviewRef> {
        let id: ReviewId = row.get("id")?;
        self.map.get_or_try_insert(id, || {
            let year: i32 = row.get("year")?;
            let summary: String = row.get("summary")?;
            let member_id: MemberId = row.get("employee_id")?;
            Review::with_id(id, year, summary, member_id)
                .map_err(|err| invalid_row("reviews", id, err))
        })
    }
}

impl ChildLister<Review> for ReviewRepository<'_> {
    fn list_by_parent(&self, parent_id: MemberId) -> RepoResult<Vec<ReviewRef>> {
        self.list_for_member(parent_id)
    }
}
