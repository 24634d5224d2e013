//! Organizational unit record.
//!
//! # Invariants
//! - `name` and `location` are never blank.
//! - `id` is owned by the repository layer; callers can only read it.

use super::{require_text, InvalidFieldError};
use serde::Serialize;

/// Store-assigned identity of a unit row.
pub type UnitId = i64;

const ENTITY: &str = "unit";

/// Organizational unit (stored in `units`).
///
/// Not `Clone`: a copy of a persisted unit would be a second in-memory
/// instance for the same identity.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Unit {
    id: Option<UnitId>,
    name: String,
    location: String,
}

impl Unit {
    /// Creates an unsaved unit after validating both text fields.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, InvalidFieldError> {
        Ok(Self {
            id: None,
            name: require_text(ENTITY, "name", name)?,
            location: require_text(ENTITY, "location", location)?,
        })
    }

    pub(crate) fn with_id(
        id: UnitId,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, InvalidFieldError> {
        let mut unit = Self::new(name, location)?;
        unit.id = Some(id);
        Ok(unit)
    }

    pub fn id(&self) -> Option<UnitId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Replaces the name; a blank value leaves the current one untouched.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), InvalidFieldError> {
        self.name = require_text(ENTITY, "name", name)?;
        Ok(())
    }

    /// Replaces the location; a blank value leaves the current one untouched.
    pub fn set_location(&mut self, location: impl Into<String>) -> Result<(), InvalidFieldError> {
        self.location = require_text(ENTITY, "location", location)?;
        Ok(())
    }

    pub(crate) fn set_id(&mut self, id: Option<UnitId>) {
        self.id = id;
    }
}
