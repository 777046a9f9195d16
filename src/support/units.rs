//! Extensions to [`uom`].
//!
//! This crate uses [`uom`] for all physical quantities at its public API
//! (temperatures, powers, mass rates, time steps, ratios).
//!
//! ## Temperature differences
//!
//! [`TemperatureDifference::minus`] subtracts one absolute temperature from
//! another and yields a [`TemperatureInterval`](uom::si::f64::TemperatureInterval),
//! which is what control errors and heater temperature rises are:
//!
//! ```
//! use uom::si::{
//!     f64::ThermodynamicTemperature,
//!     temperature_interval::kelvin as delta_kelvin,
//!     thermodynamic_temperature::degree_celsius,
//! };
//! use cabin_climate::support::units::TemperatureDifference;
//!
//! let cabin = ThermodynamicTemperature::new::<degree_celsius>(18.0);
//! let setpoint = ThermodynamicTemperature::new::<degree_celsius>(22.0);
//! let error = cabin.minus(setpoint);
//! assert!((error.get::<delta_kelvin>() + 4.0).abs() < 1e-9);
//! ```

mod temperature_difference;

pub use temperature_difference::TemperatureDifference;
