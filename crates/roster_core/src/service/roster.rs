//! Roster facade.
//!
//! # Responsibility
//! - Own the unit, member and review repositories for one connection.
//! - Wire reference checks (child → parent) and child listers (parent → child)
//!   after construction.
//!
//! # Invariants
//! - Parents hold only `Weak` listers, so the repositories never form an `Rc`
//!   cycle; dropping the facade drops all three.
//! - Deletes never cascade; `orphaned_*` report the rows left behind.

use crate::model::member::Member;
use crate::model::review::Review;
use crate::repo::member_repo::{MemberRef, MemberRepository};
use crate::repo::review_repo::{ReviewRef, ReviewRepository};
use crate::repo::unit_repo::UnitRepository;
use crate::repo::{ChildLister, RepoResult};
use log::info;
use rusqlite::Connection;
use std::rc::Rc;

/// Wired set of roster repositories sharing one connection.
pub struct Roster<'conn> {
    units: Rc<UnitRepository<'conn>>,
    members: Rc<MemberRepository<'conn>>,
    reviews: Rc<ReviewRepository<'conn>>,
}

impl<'conn> Roster<'conn> {
    /// Builds all three repositories on a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        let units = Rc::new(UnitRepository::new(conn));
        let members = Rc::new(MemberRepository::new(conn, units.clone()));
        let reviews = Rc::new(ReviewRepository::new(conn, members.clone()));

        let member_lister: Rc<dyn ChildLister<Member> + 'conn> = members.clone();
        units.attach_members(Rc::downgrade(&member_lister));
        let review_lister: Rc<dyn ChildLister<Review> + 'conn> = reviews.clone();
        members.attach_reviews(Rc::downgrade(&review_lister));

        info!("event=roster_init module=service status=ok");
        Self {
            units,
            members,
            reviews,
        }
    }

    pub fn units(&self) -> &UnitRepository<'conn> {
        &self.units
    }

    pub fn members(&self) -> &MemberRepository<'conn> {
        &self.members
    }

    pub fn reviews(&self) -> &ReviewRepository<'conn> {
        &self.reviews
    }

    /// Members whose unit has been deleted.
    pub fn orphaned_members(&self) -> RepoResult<Vec<MemberRef>> {
        self.members.list_orphans()
    }

    /// Reviews whose member has been deleted.
    pub fn orphaned_reviews(&self) -> RepoResult<Vec<ReviewRef>> {
        self.reviews.list_orphans()
    }
}
