//! # Cabin Climate
//!
//! Closed-loop cabin climate control for a vehicle cabin co-simulated with a
//! CFD/thermal solver.
//!
//! Every coupling step the host simulation hands over a
//! [`MeasurementSnapshot`](models::hvac::climate::MeasurementSnapshot) and
//! receives two commands: the heater rate to inject at the HVAC inlet and the
//! fraction of cabin air to recirculate.
//!
//! ## Crate layout
//!
//! - [`models`]: The cabin heater, the recirculation selector, and the
//!   per-step climate driver (including its [`twine_core::Model`] adapter).
//! - [`support`]: Supporting utilities used by models, such as
//!   psychrometrics and the PI(D) loop primitive.
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (tuning at construction, fog override
//! transitions, per-step decisions) and never installs a subscriber.
//! Hosts that want the output install one themselves.

pub mod models;
pub mod support;
