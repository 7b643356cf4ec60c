//! Shared display helpers for DocGuard.

pub mod geo;
pub mod time;

pub use geo::{format_coordinates, format_distance};
pub use time::{format_age, format_duration};
