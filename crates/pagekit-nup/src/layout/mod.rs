//! Geometry calculations for N-Up composition
//!
//! Everything here is pure arithmetic: grid factorization, sheet geometry
//! resolution, and per-cell page placement. Identical inputs always yield
//! bit-identical results.

mod grid;
mod placement;

pub use grid::*;
pub use placement::*;
