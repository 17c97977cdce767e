//! Receipt analysis capability boundary.
//!
//! # Responsibility
//! - Define the one-method analyzer interface vendors plug into.
//! - Ship the offline mock analyzer and the start-up provider registry.
//!
//! # Invariants
//! - Images are validated before any analyzer sees them.
//! - Exactly one analyzer is active per registry once selection ran.

pub mod analyzer;
pub mod registry;
