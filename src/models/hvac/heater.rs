//! Cabin heater PI control with an inlet-temperature ceiling.
//!
//! Each step the heater loop acts on the cabin temperature error
//! `T_cabin - T_setpoint`. The heater power it produces raises the supply
//! air from the bulk outlet temperature:
//!
//! ```text
//! T_inlet = T_bulk_outlet + Q / (m_dot * c_p)
//! ```
//!
//! If `T_inlet` would exceed the host's ceiling, the power is cut to exactly
//! reach the ceiling and the loop integral is back-solved so the control law
//! reproduces the power actually delivered.

use tracing::debug;
use uom::si::{
    f64::{MassRate, Power, ThermodynamicTemperature, Time},
    mass_rate::kilogram_per_second,
    power::watt,
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::support::{
    constraint::{Constrained, ConstraintError, StrictlyPositive},
    feedback::{FeedbackLoop, Gains},
    units::TemperatureDifference,
};

/// Specific heat of the supply air, in J/(kg·K).
const AIR_SPECIFIC_HEAT: f64 = 1005.0;

/// Heater loop tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterConfig {
    /// PI gains in W/K and W/(K·s).
    pub gains: Gains,

    /// Target mean cabin temperature.
    pub setpoint: ThermodynamicTemperature,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            gains: Gains::pi(-2.5, -5.0),
            setpoint: ThermodynamicTemperature::new::<kelvin>(295.15),
        }
    }
}

/// Host readings consumed by one heater step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterReadings {
    /// Volume-averaged cabin air temperature the loop regulates.
    pub mean_cabin_temperature: ThermodynamicTemperature,

    /// Temperature of the air leaving the HVAC unit before heating.
    pub bulk_outlet_temperature: ThermodynamicTemperature,

    /// Highest supply air temperature the host allows.
    pub inlet_temperature_ceiling: ThermodynamicTemperature,
}

/// Outcome of one heater step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterDecision {
    /// Heater power to apply.
    pub rate: Power,

    /// Supply air temperature produced by `rate`.
    pub inlet_temperature: ThermodynamicTemperature,

    /// Whether the inlet temperature ceiling cut the power.
    pub clamped: bool,
}

/// Stateful heater controller.
#[derive(Debug, Clone, PartialEq)]
pub struct CabinHeater {
    control: FeedbackLoop,
    setpoint: ThermodynamicTemperature,
    capacity_rate: f64,
}

impl CabinHeater {
    /// Creates a heater controller with a zero integral.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if a gain is not finite or the integral
    /// gain is zero.
    pub fn new(
        config: &HeaterConfig,
        mass_flow_rate: Constrained<MassRate, StrictlyPositive>,
    ) -> Result<Self, ConstraintError> {
        let mass_flow_rate = mass_flow_rate.into_inner().get::<kilogram_per_second>();

        Ok(Self {
            control: FeedbackLoop::new(config.gains)?,
            setpoint: config.setpoint,
            capacity_rate: mass_flow_rate * AIR_SPECIFIC_HEAT,
        })
    }

    /// Returns the underlying feedback loop.
    #[must_use]
    pub fn control(&self) -> &FeedbackLoop {
        &self.control
    }

    /// Returns the cabin temperature setpoint.
    #[must_use]
    pub fn setpoint(&self) -> ThermodynamicTemperature {
        self.setpoint
    }

    /// Advances the heater loop by `dt` and returns the power to apply.
    ///
    /// A bulk outlet temperature already above the ceiling yields a negative
    /// power, which is passed through unchanged.
    pub fn step(
        &mut self,
        readings: &HeaterReadings,
        dt: Constrained<Time, StrictlyPositive>,
    ) -> HeaterDecision {
        let error = readings
            .mean_cabin_temperature
            .minus(self.setpoint)
            .get::<delta_kelvin>();
        let evaluation = self.control.advance(error, dt);

        let outlet = readings.bulk_outlet_temperature.get::<kelvin>();
        let ceiling = readings.inlet_temperature_ceiling.get::<kelvin>();

        let mut rate = evaluation.output;
        let mut inlet = outlet + rate / self.capacity_rate;
        let clamped = inlet > ceiling;

        if clamped {
            rate = self.capacity_rate * (ceiling - outlet);
            inlet = ceiling;
            self.control.resolve_integral(&evaluation, rate);
            debug!(
                requested_w = evaluation.output,
                applied_w = rate,
                "heater power clamped at inlet ceiling"
            );
        }

        HeaterDecision {
            rate: Power::new::<watt>(rate),
            inlet_temperature: ThermodynamicTemperature::new::<kelvin>(inlet),
            clamped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use uom::si::{thermodynamic_temperature::degree_celsius, time::second};

    fn heater() -> CabinHeater {
        CabinHeater::new(
            &HeaterConfig::default(),
            StrictlyPositive::new(MassRate::new::<kilogram_per_second>(0.083)).unwrap(),
        )
        .unwrap()
    }

    fn one_second() -> Constrained<Time, StrictlyPositive> {
        StrictlyPositive::new(Time::new::<second>(1.0)).unwrap()
    }

    fn readings(cabin_c: f64, outlet_c: f64, ceiling_c: f64) -> HeaterReadings {
        HeaterReadings {
            mean_cabin_temperature: ThermodynamicTemperature::new::<degree_celsius>(cabin_c),
            bulk_outlet_temperature: ThermodynamicTemperature::new::<degree_celsius>(outlet_c),
            inlet_temperature_ceiling: ThermodynamicTemperature::new::<degree_celsius>(ceiling_c),
        }
    }

    #[test]
    fn unlimited_step_follows_the_control_law() {
        let mut heater = heater();

        // Error is -32 K: 2.5 * 32 + 5 * 32.
        let decision = heater.step(&readings(-10.0, -10.0, 60.0), one_second());

        assert!(!decision.clamped);
        assert_relative_eq!(decision.rate.get::<watt>(), 240.0, epsilon = 1e-9);
        assert_relative_eq!(
            decision.inlet_temperature.get::<degree_celsius>(),
            -10.0 + 240.0 / (0.083 * 1005.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(heater.control().state().integral, -32.0, epsilon = 1e-9);
    }

    #[test]
    fn inlet_ceiling_cuts_power() {
        let mut heater = heater();

        let decision = heater.step(&readings(-10.0, -10.0, -9.0), one_second());

        assert!(decision.clamped);
        assert_relative_eq!(decision.rate.get::<watt>(), 0.083 * 1005.0, epsilon = 1e-9);
        assert_relative_eq!(
            decision.inlet_temperature.get::<degree_celsius>(),
            -9.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn limited_integral_reproduces_applied_power() {
        let mut heater = heater();
        let readings = readings(-10.0, -10.0, -9.0);

        for _ in 0..50 {
            let decision = heater.step(&readings, one_second());
            let reproduced = heater.control().output(-32.0, 0.0);
            assert_relative_eq!(reproduced, decision.rate.get::<watt>(), epsilon = 1e-9);
        }

        // Without back-solving the integral would have reached -1600 K·s.
        let integral = heater.control().state().integral;
        assert_relative_eq!(integral, (83.415 - 80.0) / -5.0, epsilon = 1e-9);
    }

    #[test]
    fn outlet_above_ceiling_yields_negative_power() {
        let mut heater = heater();

        let decision = heater.step(&readings(15.0, 45.0, 40.0), one_second());

        assert!(decision.clamped);
        assert_relative_eq!(decision.rate.get::<watt>(), -5.0 * 83.415, epsilon = 1e-9);
    }

    #[test]
    fn warm_cabin_drives_power_negative() {
        let mut heater = heater();

        let decision = heater.step(&readings(24.0, 24.0, 60.0), one_second());

        assert!(!decision.clamped);
        assert!(decision.rate.get::<watt>() < 0.0);
    }

    #[test]
    fn zero_integral_gain_is_rejected() {
        let config = HeaterConfig {
            gains: Gains::pi(-2.5, 0.0),
            ..HeaterConfig::default()
        };
        let result = CabinHeater::new(
            &config,
            StrictlyPositive::new(MassRate::new::<kilogram_per_second>(0.083)).unwrap(),
        );
        assert_eq!(result, Err(ConstraintError::Zero));
    }

    proptest! {
        #[test]
        fn inlet_ceiling_is_never_exceeded(
            cabin in -30.0..40.0_f64,
            outlet in -30.0..60.0_f64,
            headroom in 0.0..40.0_f64,
            steps in 1..20_usize,
        ) {
            let mut heater = heater();
            let readings = readings(cabin, outlet, outlet + headroom);

            for _ in 0..steps {
                let decision = heater.step(&readings, one_second());
                prop_assert!(
                    decision.inlet_temperature.get::<kelvin>()
                        <= readings.inlet_temperature_ceiling.get::<kelvin>() + 1e-9
                );
            }
        }
    }
}
