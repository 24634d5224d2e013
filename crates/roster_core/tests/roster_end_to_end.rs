use roster_core::db::open_db;
use roster_core::db::open_db_in_memory;
use roster_core::db::schema::{row_count, Table};
use roster_core::Roster;
use std::rc::Rc;

#[test]
fn unit_member_review_chain() {
    let conn = open_db_in_memory().unwrap();
    let roster = Roster::new(&conn);

    let unit = roster.units().create("Engineering", "Building A").unwrap();
    let unit_id = unit.borrow().id().unwrap();
    let member = roster.members().create("Asha", "Engineer", unit_id).unwrap();
    let member_id = member.borrow().id().unwrap();
    let review = roster
        .reviews()
        .create(2024, "Solid quarter", member_id)
        .unwrap();

    let children = roster.units().list_children(&unit).unwrap();
    assert_eq!(children.len(), 1);
    assert!(Rc::ptr_eq(&children[0], &member));

    let reviews = roster.members().list_reviews(&member).unwrap();
    assert_eq!(reviews.len(), 1);
    assert!(Rc::ptr_eq(&reviews[0], &review));
}

#[test]
fn deleting_a_unit_does_not_cascade() {
    let conn = open_db_in_memory().unwrap();
    let roster = Roster::new(&conn);

    let unit = roster.units().create("Engineering", "Building A").unwrap();
    let unit_id = unit.borrow().id().unwrap();
    let member = roster.members().create("Asha", "Engineer", unit_id).unwrap();
    let member_id = member.borrow().id().unwrap();
    let review = roster
        .reviews()
        .create(2024, "Solid quarter", member_id)
        .unwrap();

    roster.units().delete(&unit).unwrap();

    assert_eq!(row_count(&conn, Table::Units).unwrap(), 0);
    assert_eq!(row_count(&conn, Table::Members).unwrap(), 1);
    assert_eq!(row_count(&conn, Table::Reviews).unwrap(), 1);

    // The member still points at the vanished unit id.
    let found = roster.members().find_by_id(member_id).unwrap().unwrap();
    assert_eq!(found.borrow().unit_id(), unit_id);
    assert_eq!(roster.members().list_reviews(&found).unwrap().len(), 1);

    let orphans = roster.orphaned_members().unwrap();
    assert_eq!(orphans.len(), 1);
    assert!(Rc::ptr_eq(&orphans[0], &member));
    assert!(roster.orphaned_reviews().unwrap().is_empty());

    roster.members().delete(&member).unwrap();
    let orphaned_reviews = roster.orphaned_reviews().unwrap();
    assert_eq!(orphaned_reviews.len(), 1);
    assert!(Rc::ptr_eq(&orphaned_reviews[0], &review));
}

#[test]
fn identity_maps_are_per_roster() {
    let conn = open_db_in_memory().unwrap();
    let first = Roster::new(&conn);
    let second = Roster::new(&conn);

    let unit = first.units().create("Engineering", "Building A").unwrap();
    let id = unit.borrow().id().unwrap();

    let seen_by_second = second.units().find_by_id(id).unwrap().unwrap();
    assert!(!Rc::ptr_eq(&unit, &seen_by_second));
    assert_eq!(*seen_by_second.borrow(), *unit.borrow());
    assert!(Rc::ptr_eq(
        &seen_by_second,
        &second.units().find_by_id(id).unwrap().unwrap()
    ));
}

#[test]
fn records_persist_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");

    let (unit_id, member_id) = {
        let conn = open_db(&path).unwrap();
        let roster = Roster::new(&conn);
        let unit = roster.units().create("Engineering", "Building A").unwrap();
        let unit_id = unit.borrow().id().unwrap();
        let member = roster.members().create("Asha", "Engineer", unit_id).unwrap();
        let member_id = member.borrow().id().unwrap();
        roster.reviews().create(2024, "Solid quarter", member_id).unwrap();
        (unit_id, member_id)
    };

    let conn = open_db(&path).unwrap();
    let roster = Roster::new(&conn);
    assert!(roster.members().identity_map().is_empty());

    let unit = roster.units().find_by_id(unit_id).unwrap().unwrap();
    assert_eq!(unit.borrow().name(), "Engineering");
    let members = roster.units().list_children(&unit).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].borrow().id(), Some(member_id));
    let reviews = roster.members().list_reviews(&members[0]).unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].borrow().year(), 2024);
}

#[test]
fn new_parent_never_adopts_orphans_of_a_deleted_one() {
    let conn = open_db_in_memory().unwrap();
    let roster = Roster::new(&conn);

    let engineering = roster.units().create("Engineering", "Building A").unwrap();
    let engineering_id = engineering.borrow().id().unwrap();
    let asha = roster
        .members()
        .create("Asha", "Engineer", engineering_id)
        .unwrap();
    let asha_id = asha.borrow().id().unwrap();
    roster
        .reviews()
        .create(2024, "Solid quarter", asha_id)
        .unwrap();

    roster.units().delete(&engineering).unwrap();
    let finance = roster.units().create("Finance", "Building B").unwrap();
    assert_ne!(finance.borrow().id(), Some(engineering_id));
    assert!(roster.units().list_children(&finance).unwrap().is_empty());

    let orphans = roster.orphaned_members().unwrap();
    assert_eq!(orphans.len(), 1);
    assert!(Rc::ptr_eq(&orphans[0], &asha));

    roster.members().delete(&asha).unwrap();
    let unit_id = finance.borrow().id().unwrap();
    let ravi = roster.members().create("Ravi", "Analyst", unit_id).unwrap();
    assert_ne!(ravi.borrow().id(), Some(asha_id));
    assert!(roster.members().list_reviews(&ravi).unwrap().is_empty());
    assert_eq!(roster.orphaned_reviews().unwrap().len(), 1);
}
