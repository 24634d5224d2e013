//! Unit repository: identity-mapped CRUD over `units`.
//!
//! # Responsibility
//! - Insert, update, delete and look up unit rows.
//! - Answer existence checks for member `unit_id` references.
//! - List a unit's members through an attached `ChildLister<Member>`.
//!
//! # Invariants
//! - A persisted unit is registered in the identity map until deleted.
//! - Deleting a unit leaves its members in place (no cascade).

use super::member_repo::MemberRef;
use super::{
    invalid_row, ChildLister, IdentityMap, ReferenceCheck, RepoError, RepoResult, Shared,
};
use crate::model::member::Member;
use crate::model::unit::{Unit, UnitId};
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use rusqlite::{params, Connection, Params, Row};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const UNIT_SELECT_SQL: &str = "SELECT id, name, location FROM units";
const ENTITY: &str = "unit";

/// Shared handle to the canonical in-memory unit.
pub type UnitRef = Shared<Unit>;

/// SQLite-backed unit repository with its own identity map.
pub struct UnitRepository<'conn> {
    conn: &'conn Connection,
    map: IdentityMap<Unit>,
    members: OnceCell<Weak<dyn ChildLister<Member> + 'conn>>,
}

impl<'conn> UnitRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            map: IdentityMap::new(ENTITY),
            members: OnceCell::new(),
        }
    }

    /// Attaches the member lister used by `list_children`.
    ///
    /// Returns `false` (and keeps the first lister) when already attached.
    pub fn attach_members(&self, members: Weak<dyn ChildLister<Member> + 'conn>) -> bool {
        let attached = self.members.set(members).is_ok();
        if !attached {
            warn!("event=repo_wire module=repo status=skipped entity=unit child=member");
        }
        attached
    }

    pub fn identity_map(&self) -> &IdentityMap<Unit> {
        &self.map
    }

    /// Validates, inserts and returns a new persisted unit.
    pub fn create(
        &self,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> RepoResult<UnitRef> {
        let unit = Rc::new(RefCell::new(Unit::new(name, location)?));
        self.insert(&unit)?;
        Ok(unit)
    }

    pub fn find_by_id(&self, id: UnitId) -> RepoResult<Option<UnitRef>> {
        self.find_one("id = ?1", [id])
    }

    /// Looks up a unit by exact name; the lowest id wins on duplicates.
    pub fn find_by_name(&self, name: &str) -> RepoResult<Option<UnitRef>> {
        self.find_one("name = ?1", [name])
    }

    /// Returns every stored unit ordered by id.
    pub fn get_all(&self) -> RepoResult<Vec<UnitRef>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{UNIT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(self.materialize(row)?);
        }
        Ok(units)
    }

    /// Inserts an unsaved unit or updates the row of a persisted one.
    pub fn save(&self, unit: &UnitRef) -> RepoResult<()> {
        let id = unit.borrow().id();
        match id {
            None => self.insert(unit),
            Some(_) => self.update(unit),
        }
    }

    /// Writes current field values to the existing row.
    ///
    /// # Errors
    /// - `MissingIdentity` when the unit was never saved.
    /// - `NotFound` when the row no longer exists.
    pub fn update(&self, unit: &UnitRef) -> RepoResult<()> {
        let current = unit.borrow();
        let id = current.id().ok_or(RepoError::MissingIdentity(ENTITY))?;
        let changed = self.conn.execute(
            "UPDATE units SET name = ?1, location = ?2 WHERE id = ?3;",
            params![current.name(), current.location(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        info!("event=record_update module=repo status=ok entity=unit id={id}");
        Ok(())
    }

    /// Deletes the row, evicts the map entry and detaches the instance.
    ///
    /// Deleting an unsaved unit is a no-op. Members of the unit are kept.
    pub fn delete(&self, unit: &UnitRef) -> RepoResult<()> {
        let id = unit.borrow().id();
        let Some(id) = id else {
            debug!("event=record_delete module=repo status=skipped entity=unit reason=unsaved");
            return Ok(());
        };
        let removed = self.conn.execute("DELETE FROM units WHERE id = ?1;", [id])?;
        self.map.evict(id);
        unit.borrow_mut().set_id(None);
        info!("event=record_delete module=repo status=ok entity=unit id={id} removed_rows={removed}");
        Ok(())
    }

    /// Returns every member whose `unit_id` is this unit's identity.
    ///
    /// An unsaved unit has no children.
    pub fn list_children(&self, unit: &UnitRef) -> RepoResult<Vec<MemberRef>> {
        let id = unit.borrow().id();
        let Some(id) = id else {
            return Ok(Vec::new());
        };
        let members = self
            .members
            .get()
            .and_then(|lister| lister.upgrade())
            .ok_or(RepoError::Unwired("member"))?;
        members.list_by_parent(id)
    }

    fn insert(&self, unit: &UnitRef) -> RepoResult<()> {
        let id = {
            let current = unit.borrow();
            self.conn.execute(
                "INSERT INTO units (name, location) VALUES (?1, ?2);",
                params![current.name(), current.location()],
            )?;
            self.conn.last_insert_rowid()
        };
        unit.borrow_mut().set_id(Some(id));
        self.map.register(id, Rc::clone(unit));
        info!("event=record_insert module=repo status=ok entity=unit id={id}");
        Ok(())
    }

    fn find_one(&self, predicate: &str, params: impl Params) -> RepoResult<Option<UnitRef>> {
        let mut stmt = self.conn.prepare(&format!(
            "{UNIT_SELECT_SQL} WHERE {predicate} ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(self.materialize(row)?)),
            None => Ok(None),
        }
    }

    fn materialize(&self, row: &Row<'_>) -> RepoResult<UnitRef> {
        let id: UnitId = row.get("id")?;
        self.map.get_or_try_insert(id, || {
            let name: String = row.get("name")?;
            let location: String = row.get("location")?;
            Unit::with_id(id, name, location).map_err(|err| invalid_row("units", id, err))
        })
    }
}

impl ReferenceCheck for UnitRepository<'_> {
    fn exists(&self, id: UnitId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM units WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
