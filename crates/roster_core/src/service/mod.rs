//! Facade over the three roster repositories.

pub mod roster;
