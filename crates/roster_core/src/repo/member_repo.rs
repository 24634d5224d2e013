//! Member repository: identity-mapped CRUD over `members`.
//!
//! # Responsibility
//! - Persist members and validate their `unit_id` against the unit store.
//! - Materialize members for `UnitRepository::list_children`.
//! - Answer existence checks for review `member_id` references.
//!
//! # Invariants
//! - Every write (create/save/update) runs `check_unit` first.
//! - A failed `assign_unit` leaves the member's prior `unit_id` in place.
//! - Deleting a member leaves its reviews in place (no cascade).

use super::review_repo::ReviewRef;
use super::{
    invalid_row, ChildLister, IdentityMap, ReferenceCheck, RepoError, RepoResult, Shared,
};
use crate::model::member::{Member, MemberId};
use crate::model::review::Review;
use crate::model::unit::UnitId;
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use rusqlite::{params, Connection, Params, Row};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const MEMBER_SELECT_SQL: &str = "SELECT id, name, job_title, department_id FROM members";
const ENTITY: &str = "member";

/// Shared handle to the canonical in-memory member.
pub type MemberRef = Shared<Member>;

/// SQLite-backed member repository with its own identity map.
pub struct MemberRepository<'conn> {
    conn: &'conn Connection,
    map: IdentityMap<Member>,
    units: Rc<dyn ReferenceCheck + 'conn>,
    reviews: OnceCell<Weak<dyn ChildLister<Review> + 'conn>>,
}

impl<'conn> MemberRepository<'conn> {
    /// Creates a repository whose `unit_id` checks go through `units`.
    pub fn new(conn: &'conn Connection, units: Rc<dyn ReferenceCheck + 'conn>) -> Self {
        Self {
            conn,
            map: IdentityMap::new(ENTITY),
            units,
            reviews: OnceCell::new(),
        }
    }

    /// Attaches the review lister used by `list_reviews`.
    pub fn attach_reviews(&self, reviews: Weak<dyn ChildLister<Review> + 'conn>) -> bool {
        let attached = self.reviews.set(reviews).is_ok();
        if !attached {
            warn!("event=repo_wire module=repo status=skipped entity=member child=review");
        }
        attached
    }

    pub fn identity_map(&self) -> &IdentityMap<Member> {
        &self.map
    }

    /// Fails with `DanglingReference` unless `unit_id` exists in `units`.
    pub fn check_unit(&self, unit_id: UnitId) -> RepoResult<()> {
        if self.units.exists(unit_id)? {
            return Ok(());
        }
        warn!("event=reference_check module=repo status=error entity=member field=unit_id id={unit_id}");
        Err(RepoError::DanglingReference {
            field: "member.unit_id",
            id: unit_id,
        })
    }

    /// Points `member` at another unit after checking the unit exists.
    ///
    /// Only the in-memory value changes; call `save` to persist it.
    pub fn assign_unit(&self, member: &MemberRef, unit_id: UnitId) -> RepoResult<()> {
        self.check_unit(unit_id)?;
        member.borrow_mut().set_unit_id(unit_id);
        Ok(())
    }

    /// Validates fields and the unit reference, then inserts a new member.
    ///
    /// No row is written when any check fails.
    pub fn create(
        &self,
        name: impl Into<String>,
        job_title: impl Into<String>,
        unit_id: UnitId,
    ) -> RepoResult<MemberRef> {
        let member = Member::new(name, job_title, unit_id)?;
        self.check_unit(unit_id)?;
        let member = Rc::new(RefCell::new(member));
        self.insert(&member)?;
        Ok(member)
    }

    pub fn find_by_id(&self, id: MemberId) -> RepoResult<Option<MemberRef>> {
        self.find_one("id = ?1", [id])
    }

    /// Looks up a member by exact name; the lowest id wins on duplicates.
    pub fn find_by_name(&self, name: &str) -> RepoResult<Option<MemberRef>> {
        self.find_one("name = ?1", [name])
    }

    pub fn get_all(&self) -> RepoResult<Vec<MemberRef>> {
        self.find_many("1 = 1", [])
    }

    /// Returns the members stored under `unit_id`, ordered by id.
    pub fn list_for_unit(&self, unit_id: UnitId) -> RepoResult<Vec<MemberRef>> {
        self.find_many("department_id = ?1", [unit_id])
    }

    /// Returns members whose unit row no longer exists.
    pub fn list_orphans(&self) -> RepoResult<Vec<MemberRef>> {
        self.find_many("department_id NOT IN (SELECT id FROM units)", [])
    }

    pub fn save(&self, member: &MemberRef) -> RepoResult<()> {
        let id = member.borrow().id();
        match id {
            None => {
                let unit_id = member.borrow().unit_id();
                self.check_unit(unit_id)?;
                self.insert(member)
            }
            Some(_) => self.update(member),
        }
    }

    /// Writes current field values to the existing row.
    ///
    /// # Errors
    /// - `MissingIdentity` when the member was never saved.
    /// - `DanglingReference` when its unit no longer exists.
    /// - `NotFound` when the row no longer exists.
    pub fn update(&self, member: &MemberRef) -> RepoResult<()> {
        let current = member.borrow();
        let id = current.id().ok_or(RepoError::MissingIdentity(ENTITY))?;
        self.check_unit(current.unit_id())?;
        let changed = self.conn.execute(
            "UPDATE members SET name = ?1, job_title = ?2, department_id = ?3 WHERE id = ?4;",
            params![current.name(), current.job_title(), current.unit_id(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        info!("event=record_update module=repo status=ok entity=member id={id}");
        Ok(())
    }

    /// Deletes the row, evicts the map entry and detaches the instance.
    pub fn delete(&self, member: &MemberRef) -> RepoResult<()> {
        let id = member.borrow().id();
        let Some(id) = id else {
            debug!("event=record_delete module=repo status=skipped entity=member reason=unsaved");
            return Ok(());
        };
        let removed = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1;", [id])?;
        self.map.evict(id);
        member.borrow_mut().set_id(None);
        info!("event=record_delete module=repo status=ok entity=member id={id} removed_rows={removed}");
        Ok(())
    }

    /// Returns every review written for `member`.
    pub fn list_reviews(&self, member: &MemberRef) -> RepoResult<Vec<ReviewRef>> {
        let id = member.borrow().id();
        let Some(id) = id else {
            return Ok(Vec::new());
        };
        let reviews = self
            .reviews
            .get()
            .and_then(|lister| lister.upgrade())
            .ok_or(RepoError::Unwired("review"))?;
        reviews.list_by_parent(id)
    }

    fn insert(&self, member: &MemberRef) -> RepoResult<()> {
        let id = {
            let current = member.borrow();
            self.conn.execute(
                "INSERT INTO members (name, job_title, department_id) VALUES (?1, ?2, ?3);",
                params![current.name(), current.job_title(), current.unit_id()],
            )?;
            self.conn.last_insert_rowid()
        };
        member.borrow_mut().set_id(Some(id));
        self.map.register(id, Rc::clone(member));
        info!("event=record_insert module=repo status=ok entity=member id={id}");
        Ok(())
    }

    fn find_one(&self, predicate: &str, params: impl Params) -> RepoResult<Option<MemberRef>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL} WHERE {predicate} ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(self.materialize(row)?)),
            None => Ok(None),
        }
    }

    fn find_many(&self, predicate: &str, params: impl Params) -> RepoResult<Vec<MemberRef>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL} WHERE {predicate} ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(self.materialize(row)?);
        }
        Ok(members)
    }

    fn materialize(&self, row: &Row<'_>) -> RepoResult<MemberRef> {
        let id: MemberId = row.get("id")?;
        self.map.get_or_try_insert(id, || {
            let name: String = row.get("name")?;
            let job_title: String = row.get("job_title")?;
            let unit_id: UnitId = row.get("department_id")?;
            Member::with_id(id, name, job_title, unit_id)
                .map_err(|err| invalid_row("members", id, err))
        })
    }
}

impl ReferenceCheck for MemberRepository<'_> {
    fn exists(&self, id: MemberId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM members WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl ChildLister<Member> for MemberRepository<'_> {
    fn list_by_parent(&self, parent_id: UnitId) -> RepoResult<Vec<MemberRef>> {
        self.list_for_unit(parent_id)
    }
}
