//! Route handlers
//!
//! Thin wrappers mapping each command onto its service.

pub mod audit;
pub mod health;
pub mod nicknames;
pub mod snapshots;
