//! Domain model for carbon events and their daily rollups.
//!
//! # Invariants
//! - Categories form a closed five-value set with a fixed order.
//! - `DailyFootprint::total` always equals the sum of its category totals.

pub mod category;
pub mod event;
pub mod footprint;
