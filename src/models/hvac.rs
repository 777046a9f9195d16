//! Cabin heating and ventilation control.
//!
//! Two actuators are driven once per coupling interval:
//!
//! - [`heater::CabinHeater`] sets the heater power so the mean cabin
//!   temperature approaches its setpoint without exceeding the inlet
//!   temperature ceiling reported by the host.
//! - [`recirculation::RecirculationSelector`] sets the recirculation ratio
//!   as the minimum of a CO2 loop and a windshield fogging loop, with a
//!   hard override to full fresh air when the windshield is fogged.
//!
//! [`climate::ClimateController`] owns both and runs them against a
//! [`climate::MeasurementSnapshot`]. [`climate::ClimateControl`] wraps it
//! as a [`twine_core::Model`].

pub mod climate;
pub mod heater;
pub mod recirculation;
