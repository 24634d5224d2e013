//! Per-repository identity map.
//!
//! # Invariants
//! - At most one instance per identity.
//! - The map is owned by one repository; there is no process-wide state.
//! - Single-threaded only (`Rc`/`RefCell`, hence `!Send`).

use super::RepoResult;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable handle to the canonical in-memory instance of a record.
pub type Shared<T> = Rc<RefCell<T>>;

/// Cache from persisted identity to the one live instance of that row.
pub struct IdentityMap<T> {
    entity: &'static str,
    entries: RefCell<HashMap<i64, Shared<T>>>,
}

impl<T> IdentityMap<T> {
    /// Creates an empty map; `entity` only labels log events.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: i64) -> Option<Shared<T>> {
        self.entries.borrow().get(&id).cloned()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub(crate) fn register(&self, id: i64, instance: Shared<T>) {
        self.entries.borrow_mut().insert(id, instance);
    }

    pub(crate) fn evict(&self, id: i64) -> Option<Shared<T>> {
        self.entries.borrow_mut().remove(&id)
    }

    /// Returns the cached instance for `id`, or builds and registers one.
    ///
    /// `build` runs only on a miss and must not touch this map.
    pub(crate) fn get_or_try_insert(
        &self,
        id: i64,
        build: impl FnOnce() -> RepoResult<T>,
    ) -> RepoResult<Shared<T>> {
        if let Some(cached) = self.get(id) {
            debug!(
                "event=identity_map_hit module=repo entity={} id={}",
                self.entity, id
            );
            return Ok(cached);
        }
        let instance = Rc::new(RefCell::new(build()?));
        self.register(id, Rc::clone(&instance));
        Ok(instance)
    }
}
