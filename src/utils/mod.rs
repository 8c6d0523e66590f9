//! Shared helpers
//!
//! - `utils::datetime` for stored timestamp handling
//! - `utils::validation` for declarative input validation

pub mod datetime;
pub mod validation;
