//! Read-only lookup for unit kinds and field presets.
//!
//! Catalog rows are immutable for the lifetime of a match, so one copy is
//! hydrated from the database at startup and shared process-wide.

mod field;
mod store;
mod unit;

pub use field::*;
pub use store::*;
pub use unit::*;
