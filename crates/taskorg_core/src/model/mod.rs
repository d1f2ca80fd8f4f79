//! Domain model for the task-organization core.
//!
//! # Responsibility
//! - Define the entity record structs shared by store, controller and
//!   rendering boundary.
//! - Define the form-input map and field-level validation error types.
//!
//! # Invariants
//! - Every entity is identified by a store-assigned integer id.
//! - Status fields are closed enumerations; invalid values never reach
//!   storage.

pub mod entities;
pub mod form;
