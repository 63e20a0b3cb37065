//! Grid geometry for the battle field.
//!
//! - [`Cell`] — 2D coordinate with Chebyshev metrics
//! - [`Grid`] — field rectangle, obstacles, reachability

mod cell;
mod grid;

pub use cell::*;
pub use grid::*;
