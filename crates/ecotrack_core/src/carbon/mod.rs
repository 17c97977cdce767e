//! Static emission factors and carbon presentation helpers.
//!
//! Everything here is a lookup table times a quantity; no state.

pub mod factors;
pub mod level;
pub mod transport;
