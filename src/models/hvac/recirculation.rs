//! Recirculation ratio selection between a CO2 loop and a fogging loop.
//!
//! Two PI loops propose a recirculation ratio each step:
//!
//! - the CO2 loop keeps the cabin CO2 concentration at its setpoint,
//! - the vapor loop keeps the inlet vapor mass fraction below saturation at
//!   a margin under the coldest glass temperature.
//!
//! Both outputs are clamped to the same bounds and the smaller one is used,
//! since more fresh air helps both. The loop that loses has its integral
//! back-solved to the selected ratio, so it takes over smoothly when its
//! constraint becomes the binding one.
//!
//! When the host reports less defogged windshield than the dry-area
//! threshold, recirculation is forced to zero and neither loop advances.

mod tuning;

pub use tuning::{Ambient, OccupantLoad, VaporTuning, steady_state_recirculation, vapor_tuning};

use thiserror::Error;
use tracing::{debug, info, warn};
use uom::si::{
    f64::{Ratio, TemperatureInterval, ThermodynamicTemperature, Time},
    ratio::{part_per_million, ratio},
    temperature_interval::kelvin as delta_kelvin,
};

use crate::support::{
    constraint::{Constrained, ConstraintError, StrictlyPositive},
    feedback::{Evaluation, FeedbackLoop, Gains, OutputBounds},
    psychro::{PsychroError, dew_point, saturation_mass_fraction, specific_humidity},
    units::TemperatureDifference,
};

/// Errors raised while deriving the recirculation loops.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TuningError {
    /// A humidity relation failed for the configured conditions.
    #[error("psychrometric evaluation failed")]
    Psychro(#[from] PsychroError),

    /// A gain or bound was rejected.
    #[error("invalid loop parameter")]
    Constraint(#[from] ConstraintError),

    /// Ambient air already holds as much vapor as the saturation limit allows.
    #[error(
        "no humidity margin: ambient fraction {ambient_fraction} is not below limit {limit_fraction}"
    )]
    NoHumidityMargin {
        ambient_fraction: f64,
        limit_fraction: f64,
    },

    /// The CO2 setpoint must lie above outside air concentration.
    #[error("CO2 setpoint {setpoint_ppm} ppm is not above ambient {ambient_ppm} ppm")]
    Co2SetpointAtAmbient { setpoint_ppm: f64, ambient_ppm: f64 },
}

/// Recirculation loop configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecirculationConfig {
    /// Target cabin CO2 concentration.
    pub co2_setpoint: Ratio,

    /// CO2 loop gains, acting on the error in ppm.
    pub co2_gains: Gains,

    /// Margin below glass temperature (and below ambient when tuning) at
    /// which air is treated as saturated.
    pub dew_point_margin: TemperatureInterval,

    /// Defogged windshield area below which recirculation is forced off.
    ///
    /// Compared directly against the host's dry-area reading.
    pub dry_area_threshold: f64,

    /// Lowest recirculation ratio either loop may emit.
    pub min_recirculation: f64,

    /// Highest recirculation ratio either loop may emit.
    pub max_recirculation: f64,

    /// Occupant and ventilation figures the vapor loop is tuned for.
    pub occupant_load: OccupantLoad,
}

impl Default for RecirculationConfig {
    fn default() -> Self {
        Self {
            co2_setpoint: Ratio::new::<part_per_million>(1000.0),
            co2_gains: Gains::pi(-0.03, -0.03 / 100.0),
            dew_point_margin: TemperatureInterval::new::<delta_kelvin>(1.0),
            dry_area_threshold: 1.9,
            min_recirculation: 0.001,
            max_recirculation: 0.95,
            occupant_load: OccupantLoad::default(),
        }
    }
}

/// Host readings consumed by one recirculation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecirculationReadings {
    /// Volume-averaged cabin CO2 concentration.
    pub co2_concentration: Ratio,

    /// Vapor mass fraction of the supply air.
    pub inlet_vapor_fraction: Ratio,

    /// Defogged windshield area, as reported by the host.
    pub dry_area: f64,

    /// Coldest interior glass surface temperature.
    pub min_glass_temperature: ThermodynamicTemperature,
}

impl RecirculationReadings {
    /// Rejects readings that would put `NaN` into the loop state.
    fn validate(&self) -> Result<(), PsychroError> {
        let finite = |value: f64, quantity: &'static str| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(PsychroError::NotFinite { quantity })
            }
        };
        finite(self.co2_concentration.get::<ratio>(), "CO2 concentration")?;
        finite(self.dry_area, "dry area")?;
        let vapor = finite(self.inlet_vapor_fraction.get::<ratio>(), "vapor mass fraction")?;
        if vapor < 0.0 {
            return Err(PsychroError::NegativeHumidity { value: vapor });
        }
        Ok(())
    }
}

/// Whether the loops are in charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecirculationMode {
    #[default]
    Normal,
    /// Windshield fogged; recirculation forced to zero.
    FogOverride,
}

/// The loop whose output was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLoop {
    /// CO2 loop asked for less recirculation.
    Co2,
    /// Vapor loop asked for less recirculation.
    Vapor,
}

/// Clamped loop outputs from a normal step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOutputs {
    /// Clamped CO2 loop output.
    pub co2: f64,

    /// Clamped vapor loop output.
    pub vapor: f64,

    /// Loop whose output was applied.
    pub active: ActiveLoop,
}

/// Outcome of one recirculation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecirculationDecision {
    /// Recirculation ratio to apply.
    pub recirculation: Ratio,

    /// Mode after this step.
    pub mode: RecirculationMode,

    /// Vapor mass fraction setpoint derived from the glass temperature.
    pub vapor_setpoint: Ratio,

    /// Loop outputs, absent under fog override.
    pub loops: Option<LoopOutputs>,
}

/// Stateful recirculation controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RecirculationSelector {
    co2: FeedbackLoop,
    vapor: FeedbackLoop,
    co2_setpoint: Ratio,
    vapor_setpoint: Ratio,
    dew_point_margin: TemperatureInterval,
    dry_area_threshold: f64,
    bounds: OutputBounds,
    mode: RecirculationMode,
    tuning: VaporTuning,
}

impl RecirculationSelector {
    /// Creates the selector for `ambient` conditions.
    ///
    /// The vapor loop gains are derived from the ambient conditions and the
    /// occupant load. The initial vapor setpoint is the saturation fraction
    /// at `dew_point_margin` below the ambient dew point.
    ///
    /// # Errors
    ///
    /// Returns a [`TuningError`] if the vapor loop cannot be tuned for these
    /// conditions or a gain or bound is invalid.
    pub fn new(config: &RecirculationConfig, ambient: &Ambient) -> Result<Self, TuningError> {
        let tuning = vapor_tuning(
            ambient,
            config.co2_setpoint,
            config.dew_point_margin,
            &config.occupant_load,
        )?;

        let ambient_dew_point = dew_point(specific_humidity(
            ambient.temperature,
            ambient.relative_humidity.into_inner(),
        )?)?;
        let vapor_setpoint =
            saturation_mass_fraction(ambient_dew_point.lowered_by(config.dew_point_margin))?;

        Ok(Self {
            co2: FeedbackLoop::new(config.co2_gains)?,
            vapor: FeedbackLoop::new(tuning.gains)?,
            co2_setpoint: config.co2_setpoint,
            vapor_setpoint,
            dew_point_margin: config.dew_point_margin,
            dry_area_threshold: config.dry_area_threshold,
            bounds: OutputBounds::new(config.min_recirculation, config.max_recirculation)?,
            mode: RecirculationMode::Normal,
            tuning,
        })
    }

    /// Returns the current mode.
    #[must_use]
    pub fn mode(&self) -> RecirculationMode {
        self.mode
    }

    /// Returns the current vapor mass fraction setpoint.
    #[must_use]
    pub fn vapor_setpoint(&self) -> Ratio {
        self.vapor_setpoint
    }

    /// Returns the CO2 feedback loop.
    #[must_use]
    pub fn co2_loop(&self) -> &FeedbackLoop {
        &self.co2
    }

    /// Returns the vapor feedback loop.
    #[must_use]
    pub fn vapor_loop(&self) -> &FeedbackLoop {
        &self.vapor
    }

    /// Returns the derived vapor loop tuning.
    #[must_use]
    pub fn tuning(&self) -> &VaporTuning {
        &self.tuning
    }

    /// Returns the bounds shared by both loops.
    #[must_use]
    pub fn bounds(&self) -> OutputBounds {
        self.bounds
    }

    /// Advances the selector by `dt`.
    ///
    /// # Errors
    ///
    /// Returns a [`PsychroError`] if a reading is not finite, the inlet vapor
    /// fraction is negative, or the vapor setpoint cannot be derived from the
    /// glass temperature. No state changes in that case.
    pub fn step(
        &mut self,
        readings: &RecirculationReadings,
        dt: Constrained<Time, StrictlyPositive>,
    ) -> Result<RecirculationDecision, PsychroError> {
        readings.validate()?;

        self.vapor_setpoint = saturation_mass_fraction(
            readings
                .min_glass_temperature
                .lowered_by(self.dew_point_margin),
        )?;

        if readings.dry_area < self.dry_area_threshold {
            if self.mode == RecirculationMode::Normal {
                warn!(
                    dry_area = readings.dry_area,
                    threshold = self.dry_area_threshold,
                    "windshield fogged, forcing fresh air"
                );
            }
            self.mode = RecirculationMode::FogOverride;
            return Ok(RecirculationDecision {
                recirculation: Ratio::new::<ratio>(0.0),
                mode: self.mode,
                vapor_setpoint: self.vapor_setpoint,
                loops: None,
            });
        }

        if self.mode == RecirculationMode::FogOverride {
            info!(
                dry_area = readings.dry_area,
                "windshield clear, resuming recirculation control"
            );
        }
        self.mode = RecirculationMode::Normal;

        let co2_error = (readings.co2_concentration - self.co2_setpoint).get::<part_per_million>();
        let co2_evaluation = self.co2.advance(co2_error, dt);
        let co2 = self.co2.saturate(&co2_evaluation, self.bounds);

        let vapor_error = (readings.inlet_vapor_fraction - self.vapor_setpoint).get::<ratio>();
        let vapor_evaluation = self.vapor.advance(vapor_error, dt);
        let vapor = self.vapor.saturate(&vapor_evaluation, self.bounds);

        let (recirculation, active) = if co2 <= vapor {
            (co2, ActiveLoop::Co2)
        } else {
            (vapor, ActiveLoop::Vapor)
        };
        self.reconcile_inactive_loop(active, recirculation, &co2_evaluation, &vapor_evaluation);

        debug!(co2, vapor, recirculation, ?active, "recirculation selected");

        Ok(RecirculationDecision {
            recirculation: Ratio::new::<ratio>(recirculation),
            mode: self.mode,
            vapor_setpoint: self.vapor_setpoint,
            loops: Some(LoopOutputs { co2, vapor, active }),
        })
    }

    /// Back-solves the losing loop's integral so its control law reproduces
    /// the selected ratio with its own gains.
    fn reconcile_inactive_loop(
        &mut self,
        active: ActiveLoop,
        recirculation: f64,
        co2: &Evaluation,
        vapor: &Evaluation,
    ) {
        match active {
            ActiveLoop::Co2 => self.vapor.resolve_integral(vapor, recirculation),
            ActiveLoop::Vapor => self.co2.resolve_integral(co2, recirculation),
        }
    }
}
