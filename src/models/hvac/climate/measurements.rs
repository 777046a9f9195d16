use std::{collections::HashMap, fmt, hash::BuildHasher};

use uom::si::{
    f64::{Ratio, ThermodynamicTemperature, Time},
    ratio::{part_per_million, ratio},
    thermodynamic_temperature::kelvin,
    time::second,
};

use crate::support::constraint::{Constrained, StrictlyPositive};

use super::MeasurementError;

/// A measurement the controllers read from the host each coupling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    /// Bulk temperature at the HVAC outlet, before heating (K).
    BulkOutletTemperature,
    /// Highest allowed supply air temperature (K).
    InletTemperatureCeiling,
    /// Volume-averaged cabin temperature (K).
    MeanCabinTemperature,
    /// Volume-averaged CO2 concentration (ppm).
    Co2Concentration,
    /// Area-averaged specific humidity at the inlet (kg/kg dry air).
    InletSpecificHumidity,
    /// Coldest interior glass surface temperature (K).
    MinGlassTemperature,
    /// Defogged windshield area.
    DryAreaFraction,
    /// Coupling time step (s).
    TimeStep,
}

impl Probe {
    /// Every measurement, in report order.
    pub const ALL: [Probe; 8] = [
        Probe::BulkOutletTemperature,
        Probe::InletTemperatureCeiling,
        Probe::MeanCabinTemperature,
        Probe::Co2Concentration,
        Probe::InletSpecificHumidity,
        Probe::MinGlassTemperature,
        Probe::DryAreaFraction,
        Probe::TimeStep,
    ];

    /// Name of the report a CFD host publishes this measurement under.
    #[must_use]
    pub fn report_name(self) -> &'static str {
        match self {
            Probe::BulkOutletTemperature => "tempBo",
            Probe::InletTemperatureCeiling => "setPointAtInlet",
            Probe::MeanCabinTemperature => "meanCabTemp",
            Probe::Co2Concentration => "CO2Conc",
            Probe::InletSpecificHumidity => "vaporMassFractionAtInlet",
            Probe::MinGlassTemperature => "minGlassTemp",
            Probe::DryAreaFraction => "dryAreaFraction",
            Probe::TimeStep => "timeStep",
        }
    }

    /// Looks up a probe by its report name.
    #[must_use]
    pub fn from_report_name(name: &str) -> Option<Probe> {
        Probe::ALL.into_iter().find(|probe| probe.report_name() == name)
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_name())
    }
}

/// Source of raw host measurements.
///
/// Values are plain numbers in the units listed on each [`Probe`] variant.
/// Returning `None` marks the measurement as unavailable.
pub trait MeasurementSource {
    /// Returns the current value of `probe`, if the host reports it.
    fn measure(&self, probe: Probe) -> Option<f64>;
}

impl<S: BuildHasher> MeasurementSource for HashMap<Probe, f64, S> {
    fn measure(&self, probe: Probe) -> Option<f64> {
        self.get(&probe).copied()
    }
}

/// Host measurements for one coupling step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSnapshot {
    /// Air temperature leaving the HVAC unit before the heater.
    pub bulk_outlet_temperature: ThermodynamicTemperature,

    /// Highest supply air temperature the heater may produce.
    pub inlet_temperature_ceiling: ThermodynamicTemperature,

    /// Volume-averaged cabin air temperature.
    pub mean_cabin_temperature: ThermodynamicTemperature,

    /// Volume-averaged cabin CO2 concentration.
    pub co2_concentration: Ratio,

    /// Specific humidity (kg vapor per kg dry air) of the supply air.
    pub inlet_specific_humidity: Ratio,

    /// Coldest interior glass surface temperature.
    pub min_glass_temperature: ThermodynamicTemperature,

    /// Defogged windshield area, compared against the dry-area threshold.
    pub dry_area_fraction: f64,

    /// Time elapsed since the previous coupling step.
    pub time_step: Constrained<Time, StrictlyPositive>,
}

impl MeasurementSnapshot {
    /// Reads every [`Probe`] from `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`MeasurementError`] if a probe is missing or not finite, or
    /// if the time step is not strictly positive.
    pub fn capture(source: &impl MeasurementSource) -> Result<Self, MeasurementError> {
        let read = |probe: Probe| -> Result<f64, MeasurementError> {
            let value = source
                .measure(probe)
                .ok_or(MeasurementError::Unavailable { probe })?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(MeasurementError::NotFinite { probe, value })
            }
        };
        let temperature = |probe: Probe| read(probe).map(ThermodynamicTemperature::new::<kelvin>);

        Ok(Self {
            bulk_outlet_temperature: temperature(Probe::BulkOutletTemperature)?,
            inlet_temperature_ceiling: temperature(Probe::InletTemperatureCeiling)?,
            mean_cabin_temperature: temperature(Probe::MeanCabinTemperature)?,
            co2_concentration: Ratio::new::<part_per_million>(read(Probe::Co2Concentration)?),
            inlet_specific_humidity: Ratio::new::<ratio>(read(Probe::InletSpecificHumidity)?),
            min_glass_temperature: temperature(Probe::MinGlassTemperature)?,
            dry_area_fraction: read(Probe::DryAreaFraction)?,
            time_step: StrictlyPositive::new(Time::new::<second>(read(Probe::TimeStep)?))?,
        })
    }
}
