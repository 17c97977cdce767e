//! Repository layer: the datastore collaborator behind the aggregation service.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from aggregation logic.
//!
//! # Invariants
//! - Write paths validate events before any SQL mutation.
//! - Storage failures surface as `RepoError::Db` without retries.

pub mod footprint_repo;
