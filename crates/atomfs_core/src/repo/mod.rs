//! Catalog persistence.
//!
//! # Responsibility
//! - Define the record-store contract the store core consumes.
//! - Keep SQL details out of the checker, collector and lifecycle code.
//!
//! # Invariants
//! - Not-found conditions are reported as semantic errors, distinct from
//!   SQLite transport errors.

pub mod catalog_repo;
