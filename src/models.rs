//! Public climate control models.
//!
//! Models are the primary public interface of this crate.
//!
//! # Organization
//!
//! Models are grouped by domain. The cabin HVAC controllers live in [`hvac`].
//!
//! # Model structure
//!
//! Each controller exposes a stateful core API (`new`, `step`) that owns its
//! loop state. The [`twine_core::Model`] implementation is a thin adapter
//! over that API which takes the controller state as part of its input and
//! returns the advanced state alongside the outputs, so repeated calls stay
//! pure.

pub mod hvac;
