use uom::si::{
    f64::{MassRate, Power, Ratio, ThermodynamicTemperature, Time},
    mass_rate::kilogram_per_second,
    power::watt,
    ratio::ratio,
    thermodynamic_temperature::degree_celsius,
    time::second,
};

use crate::{
    models::hvac::{heater::HeaterConfig, recirculation::RecirculationConfig},
    support::constraint::{Constrained, UnitInterval},
};

/// Configuration of a [`ClimateController`](super::ClimateController), fixed for a run.
///
/// The defaults describe a winter scenario: -10 °C outside air at 70 %
/// relative humidity and a 0.083 kg/s blower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateConfig {
    /// Outside air temperature.
    pub ambient_temperature: ThermodynamicTemperature,

    /// Must lie strictly between 0 and 1.
    pub ambient_relative_humidity: Ratio,

    /// Supply air mass flow rate through the heater.
    pub mass_flow_rate: MassRate,

    /// Heater rating.
    ///
    /// Validated and reported, but not applied by the control law; the
    /// heater is limited only by the inlet temperature ceiling.
    pub max_heater_rate: Power,

    /// Interval at which the host calls the controller.
    ///
    /// The heater loop integrates over this interval; the recirculation
    /// loops integrate over the time step reported in each snapshot.
    pub coupling_time: Time,

    /// Heater power applied before the first step.
    pub initial_heater_rate: Power,

    /// Whether the recirculation loops run at all.
    pub recirculation_control: bool,

    /// Recirculation ratio held when `recirculation_control` is off.
    pub fixed_recirculation: Constrained<Ratio, UnitInterval>,

    /// Heater loop tuning.
    pub heater: HeaterConfig,

    /// Recirculation loop tuning.
    pub recirculation: RecirculationConfig,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            ambient_temperature: ThermodynamicTemperature::new::<degree_celsius>(-10.0),
            ambient_relative_humidity: Ratio::new::<ratio>(0.7),
            mass_flow_rate: MassRate::new::<kilogram_per_second>(0.083),
            max_heater_rate: Power::new::<watt>(1e4),
            coupling_time: Time::new::<second>(1.0),
            initial_heater_rate: Power::new::<watt>(100.0),
            recirculation_control: true,
            fixed_recirculation: UnitInterval::zero(),
            heater: HeaterConfig::default(),
            recirculation: RecirculationConfig::default(),
        }
    }
}
