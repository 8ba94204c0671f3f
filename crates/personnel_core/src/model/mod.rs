//! Personnel domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by store and form binder.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `EmployeeId`.
//! - Deletion is permanent; there are no tombstones.

pub mod employee;
