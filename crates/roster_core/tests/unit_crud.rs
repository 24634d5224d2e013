use roster_core::db::open_db_in_memory;
use roster_core::{FieldViolation, RepoError, Roster, Unit, UnitRepository};
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::rc::Rc;

fn stored_unit(conn: &Connection, id: i64) -> Option<(String, String)> {
    conn.query_row(
        "SELECT name, location FROM units WHERE id = ?1;",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .ok()
}

#[test]
fn create_assigns_identity_visible_in_get_all() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);

    let unit = repo.create("Engineering", "Building A").unwrap();
    let id = unit.borrow().id().unwrap();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert!(Rc::ptr_eq(&all[0], &unit));
    assert_eq!(all[0].borrow().id(), Some(id));
    assert!(repo.identity_map().contains(id));
}

#[test]
fn find_by_id_returns_the_same_instance() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);

    let created = repo.create("Engineering", "Building A").unwrap();
    let id = created.borrow().id().unwrap();

    let found = repo.find_by_id(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&created, &found));
    assert_eq!(*found.borrow(), *created.borrow());
    assert!(repo.find_by_id(id + 100).unwrap().is_none());
}

#[test]
fn find_by_name_materializes_uncached_rows_once() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO units (name, location) VALUES (?1, ?2);",
        params!["Finance", "Building B"],
    )
    .unwrap();
    let repo = UnitRepository::new(&conn);
    assert!(repo.identity_map().is_empty());

    let first = repo.find_by_name("Finance").unwrap().unwrap();
    let second = repo.find_by_name("Finance").unwrap().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.borrow().location(), "Building B");
    assert_eq!(repo.identity_map().len(), 1);
    assert!(repo.find_by_name("Legal").unwrap().is_none());
}

#[test]
fn cached_instance_wins_over_external_row_changes() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);
    let unit = repo.create("Engineering", "Building A").unwrap();
    let id = unit.borrow().id().unwrap();

    conn.execute(
        "UPDATE units SET location = 'Building Z' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let found = repo.find_by_id(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&unit, &found));
    assert_eq!(found.borrow().location(), "Building A");
}

#[test]
fn blank_fields_fail_before_any_store_access() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);

    for (name, location) in [("", "Building A"), ("Engineering", "   "), ("\t", "\n")] {
        let err = repo.create(name, location).unwrap_err();
        match err {
            RepoError::InvalidField(field_err) => {
                assert_eq!(field_err.entity, "unit");
                assert_eq!(field_err.violation, FieldViolation::Blank);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn save_inserts_then_updates() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);

    let unit = Rc::new(RefCell::new(Unit::new("Ops", "Basement").unwrap()));
    repo.save(&unit).unwrap();
    let id = unit.borrow().id().unwrap();

    unit.borrow_mut().set_location("Roof").unwrap();
    repo.save(&unit).unwrap();
    assert_eq!(
        stored_unit(&conn, id),
        Some(("Ops".to_string(), "Roof".to_string()))
    );
    assert_eq!(repo.identity_map().len(), 1);
}

#[test]
fn saving_twice_without_changes_leaves_row_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);
    let unit = repo.create("Engineering", "Building A").unwrap();
    let id = unit.borrow().id().unwrap();
    let before = stored_unit(&conn, id);

    repo.save(&unit).unwrap();
    repo.save(&unit).unwrap();

    assert_eq!(stored_unit(&conn, id), before);
    assert_eq!(unit.borrow().id(), Some(id));
    assert_eq!(repo.get_all().unwrap().len(), 1);
}

#[test]
fn update_on_unsaved_unit_fails_with_missing_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);
    let unit = Rc::new(RefCell::new(Unit::new("Ops", "Basement").unwrap()));

    let err = repo.update(&unit).unwrap_err();
    assert!(matches!(err, RepoError::MissingIdentity("unit")));
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn update_of_vanished_row_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);
    let unit = repo.create("Ops", "Basement").unwrap();
    let id = unit.borrow().id().unwrap();
    conn.execute("DELETE FROM units WHERE id = ?1;", [id]).unwrap();

    let err = repo.update(&unit).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "unit", id: missing } if missing == id));
}

#[test]
fn delete_evicts_and_detaches_instance() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);
    let unit = repo.create("Engineering", "Building A").unwrap();
    let old_id = unit.borrow().id().unwrap();

    repo.delete(&unit).unwrap();

    assert_eq!(unit.borrow().id(), None);
    assert!(!repo.identity_map().contains(old_id));
    assert!(repo.find_by_id(old_id).unwrap().is_none());
    assert_eq!(unit.borrow().name(), "Engineering");

    // A detached unit can be saved again as a brand-new row.
    repo.save(&unit).unwrap();
    let new_id = unit.borrow().id().unwrap();
    assert_ne!(new_id, old_id);
    assert!(Rc::ptr_eq(&repo.find_by_id(new_id).unwrap().unwrap(), &unit));
}

#[test]
fn delete_on_unsaved_unit_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);
    let unit = Rc::new(RefCell::new(Unit::new("Ops", "Basement").unwrap()));

    repo.delete(&unit).unwrap();
    assert_eq!(unit.borrow().id(), None);
}

#[test]
fn list_children_requires_a_wired_member_lister() {
    let conn = open_db_in_memory().unwrap();
    let repo = UnitRepository::new(&conn);
    let unit = repo.create("Engineering", "Building A").unwrap();

    let err = repo.list_children(&unit).unwrap_err();
    assert!(matches!(err, RepoError::Unwired("member")));

    let roster = Roster::new(&conn);
    let wired = roster.units().create("Finance", "Building B").unwrap();
    assert!(roster.units().list_children(&wired).unwrap().is_empty());
}

#[test]
fn invalid_persisted_row_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO units (name, location) VALUES ('  ', 'Building A');",
        [],
    )
    .unwrap();
    let repo = UnitRepository::new(&conn);

    let err = repo.get_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(repo.identity_map().is_empty());
}
