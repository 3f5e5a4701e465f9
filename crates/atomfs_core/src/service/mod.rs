//! Store use-case services.
//!
//! # Responsibility
//! - Implement integrity checking, garbage collection and molecule lifecycle
//!   on top of the `Catalog` contract and the content directory.
//! - Stay storage-agnostic: services only see `Catalog` and `ContentDir`.

pub mod fsck;
pub mod gc;
pub mod molecule_service;
