//! Per-coupling-step climate control driver.
//!
//! A [`ClimateController`] owns the heater loop and, when recirculation
//! control is enabled, the recirculation selector. The host calls
//! [`ClimateController::step`] once per coupling step after its flow solve,
//! passing a [`MeasurementSnapshot`], and applies the returned
//! [`ControlOutputs`] before the next solve.

mod config;
mod error;
mod measurements;
mod model;

pub use config::ClimateConfig;
pub use error::{ConfigError, MeasurementError, StepError};
pub use measurements::{MeasurementSnapshot, MeasurementSource, Probe};
pub use model::{ClimateControl, ClimateInput, ClimateOutput};

use tracing::debug;
use uom::si::{
    f64::{Power, Ratio, Time},
    power::watt,
    ratio::ratio,
    thermodynamic_temperature::degree_celsius,
};

use crate::{
    models::hvac::{
        heater::{CabinHeater, HeaterDecision, HeaterReadings},
        recirculation::{
            Ambient, RecirculationDecision, RecirculationReadings, RecirculationSelector,
        },
    },
    support::{
        constraint::{Constrained, ConstraintError, StrictlyPositive, UnitIntervalOpen},
        psychro::vapor_mass_fraction,
    },
};

/// Commands for the host to apply until the next step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutputs {
    /// Heater power injected at the HVAC inlet.
    pub heater_rate: Power,

    /// Share of cabin air recirculated, between 0 and 1.
    pub recirculation: Ratio,
}

/// Commands from one step together with the decisions behind them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Commands to apply.
    pub outputs: ControlOutputs,

    /// Heater step outcome behind `outputs.heater_rate`.
    pub heater: HeaterDecision,

    /// Absent when recirculation control is disabled.
    pub recirculation: Option<RecirculationDecision>,
}

/// Cabin climate controller.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use cabin_climate::models::hvac::climate::{
///     ClimateConfig, ClimateController, MeasurementSnapshot, Probe,
/// };
/// use uom::si::{power::watt, ratio::ratio};
///
/// let mut controller = ClimateController::new(&ClimateConfig::default()).unwrap();
///
/// let initial = controller.initial_outputs();
/// assert_eq!(initial.heater_rate.get::<watt>(), 100.0);
///
/// let readings = HashMap::from([
///     (Probe::BulkOutletTemperature, 263.15),
///     (Probe::InletTemperatureCeiling, 333.15),
///     (Probe::MeanCabinTemperature, 263.15),
///     (Probe::Co2Concentration, 800.0),
///     (Probe::InletSpecificHumidity, 1.0e-3),
///     (Probe::MinGlassTemperature, 265.0),
///     (Probe::DryAreaFraction, 2.0),
///     (Probe::TimeStep, 1.0),
/// ]);
/// let snapshot = MeasurementSnapshot::capture(&readings).unwrap();
/// let report = controller.step(&snapshot).unwrap();
///
/// assert!(report.outputs.heater_rate.get::<watt>() > 0.0);
/// assert!(report.outputs.recirculation.get::<ratio>() <= 0.95);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateController {
    heater: CabinHeater,
    recirculation: Option<RecirculationSelector>,
    fixed_recirculation: Ratio,
    coupling_time: Constrained<Time, StrictlyPositive>,
    max_heater_rate: Constrained<Power, StrictlyPositive>,
    initial: ControlOutputs,
}

impl ClimateController {
    /// Creates a controller from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a configured quantity is out of range or
    /// the recirculation loops cannot be tuned for the ambient conditions.
    pub fn new(config: &ClimateConfig) -> Result<Self, ConfigError> {
        let mass_flow_rate = StrictlyPositive::new(config.mass_flow_rate)
            .map_err(ConfigError::field("mass flow rate"))?;
        let max_heater_rate = StrictlyPositive::new(config.max_heater_rate)
            .map_err(ConfigError::field("max heater rate"))?;
        let coupling_time = StrictlyPositive::new(config.coupling_time)
            .map_err(ConfigError::field("coupling time"))?;
        let relative_humidity = UnitIntervalOpen::new(config.ambient_relative_humidity)
            .map_err(ConfigError::field("ambient relative humidity"))?;
        if !config.initial_heater_rate.is_finite() {
            return Err(ConfigError::Constraint {
                field: "initial heater rate",
                source: ConstraintError::NotANumber,
            });
        }

        let heater = CabinHeater::new(&config.heater, mass_flow_rate)
            .map_err(ConfigError::field("heater gains"))?;

        let ambient = Ambient {
            temperature: config.ambient_temperature,
            relative_humidity,
        };

        let fixed_recirculation = config.fixed_recirculation.into_inner();
        let (recirculation, initial_recirculation) = if config.recirculation_control {
            let selector = RecirculationSelector::new(&config.recirculation, &ambient)?;
            let initial = selector.bounds().clamp(adaptive_recirculation(&ambient));
            (Some(selector), Ratio::new::<ratio>(initial))
        } else {
            (None, fixed_recirculation)
        };

        Ok(Self {
            heater,
            recirculation,
            fixed_recirculation,
            coupling_time,
            max_heater_rate,
            initial: ControlOutputs {
                heater_rate: config.initial_heater_rate,
                recirculation: initial_recirculation,
            },
        })
    }

    /// Returns the commands to apply before the first step.
    #[must_use]
    pub fn initial_outputs(&self) -> ControlOutputs {
        self.initial
    }

    /// Returns the heater controller.
    #[must_use]
    pub fn heater(&self) -> &CabinHeater {
        &self.heater
    }

    /// Returns the configured heater rating.
    ///
    /// The rating is reported to the host as configured; the heater control
    /// law is limited only by the inlet temperature ceiling.
    #[must_use]
    pub fn max_heater_rate(&self) -> Power {
        self.max_heater_rate.into_inner()
    }

    /// Returns the recirculation selector, if recirculation control is on.
    #[must_use]
    pub fn recirculation(&self) -> Option<&RecirculationSelector> {
        self.recirculation.as_ref()
    }

    /// Runs both controllers against `snapshot`.
    ///
    /// The heater loop integrates over the configured coupling time and the
    /// recirculation loops over the snapshot's time step.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Psychro`] if the inlet humidity is negative or the
    /// vapor setpoint cannot be derived from the glass temperature. The
    /// controller is left unchanged.
    pub fn step(&mut self, snapshot: &MeasurementSnapshot) -> Result<StepReport, StepError> {
        let recirculation = match self.recirculation.as_mut() {
            Some(selector) => {
                let readings = RecirculationReadings {
                    co2_concentration: snapshot.co2_concentration,
                    inlet_vapor_fraction: vapor_mass_fraction(snapshot.inlet_specific_humidity)?,
                    dry_area: snapshot.dry_area_fraction,
                    min_glass_temperature: snapshot.min_glass_temperature,
                };
                Some(selector.step(&readings, snapshot.time_step)?)
            }
            None => None,
        };

        let heater = self.heater.step(
            &HeaterReadings {
                mean_cabin_temperature: snapshot.mean_cabin_temperature,
                bulk_outlet_temperature: snapshot.bulk_outlet_temperature,
                inlet_temperature_ceiling: snapshot.inlet_temperature_ceiling,
            },
            self.coupling_time,
        );

        let outputs = ControlOutputs {
            heater_rate: heater.rate,
            recirculation: recirculation
                .map_or(self.fixed_recirculation, |decision| decision.recirculation),
        };

        debug!(
            heater_w = outputs.heater_rate.get::<watt>(),
            recirculation = outputs.recirculation.get::<ratio>(),
            "climate step"
        );

        Ok(StepReport {
            outputs,
            heater,
            recirculation,
        })
    }

    /// Captures a snapshot from `source` and steps against it.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Measurement`] if a measurement is missing or
    /// invalid, otherwise as [`ClimateController::step`].
    pub fn step_from(&mut self, source: &impl MeasurementSource) -> Result<StepReport, StepError> {
        let snapshot = MeasurementSnapshot::capture(source)?;
        self.step(&snapshot)
    }
}

/// Recirculation ratio to start from: drier and warmer outside air allows more.
fn adaptive_recirculation(ambient: &Ambient) -> f64 {
    let rh = ambient.relative_humidity.into_inner().get::<ratio>();
    let celsius = ambient.temperature.get::<degree_celsius>();
    (1.0 - rh) * (1.0 + (celsius + 20.0) / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use approx::assert_relative_eq;
    use twine_core::Model;
    use uom::si::{f64::MassRate, mass_rate::kilogram_per_second, time::second};

    use crate::{
        models::hvac::recirculation::{ActiveLoop, RecirculationMode, TuningError},
        support::{
            constraint::UnitInterval,
            psychro::{PsychroError, specific_humidity},
        },
    };

    fn winter_humidity() -> f64 {
        let config = ClimateConfig::default();
        specific_humidity(config.ambient_temperature, config.ambient_relative_humidity)
            .unwrap()
            .get::<ratio>()
    }

    fn readings(co2_ppm: f64, dry_area: f64, glass_k: f64) -> HashMap<Probe, f64> {
        HashMap::from([
            (Probe::BulkOutletTemperature, 263.15),
            (Probe::InletTemperatureCeiling, 333.15),
            (Probe::MeanCabinTemperature, 263.15),
            (Probe::Co2Concentration, co2_ppm),
            (Probe::InletSpecificHumidity, winter_humidity()),
            (Probe::MinGlassTemperature, glass_k),
            (Probe::DryAreaFraction, dry_area),
            (Probe::TimeStep, 1.0),
        ])
    }

    fn snapshot(co2_ppm: f64, dry_area: f64, glass_k: f64) -> MeasurementSnapshot {
        MeasurementSnapshot::capture(&readings(co2_ppm, dry_area, glass_k)).unwrap()
    }

    #[test]
    fn winter_initial_outputs() {
        let controller = ClimateController::new(&ClimateConfig::default()).unwrap();
        let initial = controller.initial_outputs();

        assert_relative_eq!(initial.heater_rate.get::<watt>(), 100.0);
        assert_relative_eq!(initial.recirculation.get::<ratio>(), 0.45, epsilon = 1e-12);
    }

    #[test]
    fn winter_tuning_is_finite_and_negative() {
        let controller = ClimateController::new(&ClimateConfig::default()).unwrap();
        let selector = controller.recirculation().unwrap();

        let gains = selector.vapor_loop().gains();
        assert!(gains.kp.is_finite() && gains.kp < 0.0);
        assert!(gains.ki.is_finite() && gains.ki < 0.0);
        assert!(selector.vapor_setpoint().get::<ratio>().is_finite());
    }

    #[test]
    fn co2_at_setpoint_holds_recirculation_at_lower_bound() {
        let mut controller = ClimateController::new(&ClimateConfig::default()).unwrap();

        let report = controller.step(&snapshot(1000.0, 2.0, 263.15)).unwrap();
        let decision = report.recirculation.unwrap();
        let loops = decision.loops.unwrap();

        assert_relative_eq!(loops.co2, 0.001);
        assert_eq!(loops.active, ActiveLoop::Co2);
        assert_relative_eq!(report.outputs.recirculation.get::<ratio>(), 0.001);

        // Cold cabin, generous ceiling: the heater follows its control law.
        assert!(!report.heater.clamped);
        assert_relative_eq!(report.outputs.heater_rate.get::<watt>(), 240.0, epsilon = 1e-9);
    }

    #[test]
    fn fogged_windshield_forces_fresh_air_while_heating_continues() {
        let mut controller = ClimateController::new(&ClimateConfig::default()).unwrap();

        let report = controller.step(&snapshot(800.0, 1.0, 263.15)).unwrap();

        assert_eq!(
            report.recirculation.map(|decision| decision.mode),
            Some(RecirculationMode::FogOverride)
        );
        assert!(report.outputs.recirculation.get::<ratio>() == 0.0);
        assert!(report.outputs.heater_rate.get::<watt>() > 0.0);
    }

    #[test]
    fn fixed_recirculation_when_control_is_off() {
        let config = ClimateConfig {
            recirculation_control: false,
            fixed_recirculation: UnitInterval::new(Ratio::new::<ratio>(0.3)).unwrap(),
            ..ClimateConfig::default()
        };
        let mut controller = ClimateController::new(&config).unwrap();
        assert!(controller.recirculation().is_none());
        assert_relative_eq!(controller.initial_outputs().recirculation.get::<ratio>(), 0.3);

        for dry_area in [2.0, 1.0] {
            let report = controller.step(&snapshot(1500.0, dry_area, 263.15)).unwrap();
            assert_eq!(report.recirculation, None);
            assert_relative_eq!(report.outputs.recirculation.get::<ratio>(), 0.3);
        }
    }

    #[test]
    fn heater_rating_does_not_cap_the_control_law() {
        let config = ClimateConfig {
            max_heater_rate: Power::new::<watt>(150.0),
            ..ClimateConfig::default()
        };
        let mut controller = ClimateController::new(&config).unwrap();
        assert_relative_eq!(controller.max_heater_rate().get::<watt>(), 150.0);

        let report = controller.step(&snapshot(900.0, 2.0, 263.15)).unwrap();

        assert!(!report.heater.clamped);
        assert_relative_eq!(report.outputs.heater_rate.get::<watt>(), 240.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let zero_flow = ClimateConfig {
            mass_flow_rate: MassRate::new::<kilogram_per_second>(0.0),
            ..ClimateConfig::default()
        };
        assert_eq!(
            ClimateController::new(&zero_flow),
            Err(ConfigError::Constraint {
                field: "mass flow rate",
                source: ConstraintError::Zero,
            })
        );

        let saturated = ClimateConfig {
            ambient_relative_humidity: Ratio::new::<ratio>(1.0),
            ..ClimateConfig::default()
        };
        assert_eq!(
            ClimateController::new(&saturated),
            Err(ConfigError::Constraint {
                field: "ambient relative humidity",
                source: ConstraintError::AboveMaximum,
            })
        );

        let humid = ClimateConfig {
            ambient_relative_humidity: Ratio::new::<ratio>(0.99),
            ..ClimateConfig::default()
        };
        assert!(matches!(
            ClimateController::new(&humid),
            Err(ConfigError::Tuning(TuningError::NoHumidityMargin { .. }))
        ));

        let zero_coupling = ClimateConfig {
            coupling_time: Time::new::<second>(0.0),
            ..ClimateConfig::default()
        };
        assert!(matches!(
            ClimateController::new(&zero_coupling),
            Err(ConfigError::Constraint {
                field: "coupling time",
                ..
            })
        ));
    }

    #[test]
    fn failed_step_leaves_controller_unchanged() {
        let mut controller = ClimateController::new(&ClimateConfig::default()).unwrap();
        controller.step(&snapshot(900.0, 2.0, 263.15)).unwrap();
        let before = controller.clone();

        let result = controller.step(&snapshot(900.0, 2.0, -30.0));

        assert!(matches!(result, Err(StepError::Psychro(_))));
        assert_eq!(controller, before);
    }

    #[test]
    fn negative_inlet_humidity_is_reported_without_corrupting_loops() {
        let mut controller = ClimateController::new(&ClimateConfig::default()).unwrap();
        controller.step(&snapshot(900.0, 2.0, 263.15)).unwrap();
        let before = controller.clone();

        let mut source = readings(900.0, 2.0, 263.15);
        source.insert(Probe::InletSpecificHumidity, -1.0);
        assert_eq!(
            controller.step_from(&source),
            Err(StepError::Psychro(PsychroError::NegativeHumidity { value: -1.0 }))
        );
        assert_eq!(controller, before);

        let report = controller.step(&snapshot(900.0, 2.0, 263.15)).unwrap();
        let recirculation = report.outputs.recirculation.get::<ratio>();
        assert!((0.001..=0.95).contains(&recirculation));
        let selector = controller.recirculation().unwrap();
        assert!(selector.co2_loop().state().integral.is_finite());
        assert!(selector.vapor_loop().state().integral.is_finite());
    }

    #[test]
    fn missing_measurement_propagates() {
        let mut controller = ClimateController::new(&ClimateConfig::default()).unwrap();
        let mut source = readings(900.0, 2.0, 263.15);
        source.remove(&Probe::DryAreaFraction);

        assert_eq!(
            controller.step_from(&source),
            Err(StepError::Measurement(MeasurementError::Unavailable {
                probe: Probe::DryAreaFraction
            }))
        );
    }

    #[test]
    fn model_call_is_pure() {
        let input = ClimateInput {
            controller: ClimateController::new(&ClimateConfig::default()).unwrap(),
            measurements: snapshot(1200.0, 2.0, 263.15),
        };
        let original = input.clone();

        let first = ClimateControl.call(&input).unwrap();
        let repeat = ClimateControl.call(&input).unwrap();

        assert_eq!(input, original);
        assert_eq!(first, repeat);
        assert_ne!(first.controller, input.controller);

        let next = ClimateControl
            .call(&ClimateInput {
                controller: first.controller,
                measurements: input.measurements,
            })
            .unwrap();
        assert_relative_eq!(
            next.controller.heater().control().state().integral,
            -64.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn co2_above_setpoint_raises_fresh_air_share() {
        let mut controller = ClimateController::new(&ClimateConfig::default()).unwrap();
        let co2_readings = |ppm: f64| {
            let mut snapshot = snapshot(ppm, 2.0, 263.15);
            // Dry supply air keeps the vapor loop at its ceiling.
            snapshot.inlet_specific_humidity = Ratio::new::<ratio>(1e-5);
            snapshot
        };

        let low = controller.step(&co2_readings(600.0)).unwrap();
        let high = controller.step(&co2_readings(1400.0)).unwrap();

        assert!(
            high.outputs.recirculation.get::<ratio>() < low.outputs.recirculation.get::<ratio>()
        );
        assert_relative_eq!(
            high.recirculation.unwrap().loops.unwrap().co2,
            high.outputs.recirculation.get::<ratio>()
        );
    }
}
