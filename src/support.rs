//! Crate-level support utilities.
//!
//! - [`constraint`]: Type-level numeric invariants checked at construction.
//! - [`feedback`]: The PI(D) loop primitive with back-solving anti-windup.
//! - [`psychro`]: Psychrometric relations for moist air.
//! - [`units`]: Extensions to [`uom`].

pub mod constraint;
pub mod feedback;
pub mod psychro;
pub mod units;
