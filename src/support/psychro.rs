//! Psychrometric relations for moist air at standard atmospheric pressure.
//!
//! Saturation pressure follows an Antoine-type correlation in Kelvin-shifted form:
//!
//! ```text
//! p_sat(T) = 101325 Pa * exp(a - b / (T + 273.15 + c)),   T in °C
//! a = 11.949, b = 3978.205, c = -39.801
//! ```
//!
//! The remaining relations are the usual ideal-mixture identities built on
//! it, with a water/air molar mass ratio of 0.622. [`dew_point`] is the exact
//! algebraic inverse of [`specific_humidity`] at 100 % relative humidity.
//!
//! All functions are pure. Inputs that would drive a relation outside its
//! domain are reported as a [`PsychroError`].
//!
//! # Example
//!
//! ```
//! use cabin_climate::support::psychro::{dew_point, specific_humidity};
//! use uom::si::{
//!     f64::{Ratio, ThermodynamicTemperature},
//!     ratio::percent,
//!     thermodynamic_temperature::degree_celsius,
//! };
//!
//! let t = ThermodynamicTemperature::new::<degree_celsius>(5.0);
//! let q = specific_humidity(t, Ratio::new::<percent>(100.0)).unwrap();
//! let dew = dew_point(q).unwrap();
//! assert!((dew.get::<degree_celsius>() - 5.0).abs() < 1e-9);
//! ```

mod error;

pub use error::PsychroError;

use uom::si::{
    f64::{Pressure, Ratio, ThermodynamicTemperature},
    pressure::pascal,
    ratio::ratio,
    thermodynamic_temperature::degree_celsius,
};

const A: f64 = 11.949;
const B: f64 = 3978.205;
const C: f64 = -39.801;

const ATMOSPHERIC_PRESSURE: f64 = 101_325.0;
const MOLAR_MASS_RATIO: f64 = 0.622;
const CELSIUS_OFFSET: f64 = 273.15;

/// Returns the saturation vapor pressure of water at `temperature`.
///
/// # Errors
///
/// Returns a [`PsychroError`] if the temperature is not finite or lies at or
/// below the pole of the correlation (about -233 °C).
pub fn saturation_pressure(
    temperature: ThermodynamicTemperature,
) -> Result<Pressure, PsychroError> {
    let celsius = celsius(temperature)?;
    Ok(Pressure::new::<pascal>(saturation_pressure_pa(celsius)?))
}

/// Returns the specific humidity (kg vapor per kg dry air) of air at
/// `temperature` and `relative_humidity`.
///
/// # Errors
///
/// Returns a [`PsychroError`] if an input is not finite, the relative
/// humidity is negative, or the vapor partial pressure reaches atmospheric
/// pressure (high humidity near boiling).
pub fn specific_humidity(
    temperature: ThermodynamicTemperature,
    relative_humidity: Ratio,
) -> Result<Ratio, PsychroError> {
    let celsius = celsius(temperature)?;
    let fraction = finite(relative_humidity.get::<ratio>(), "relative humidity")?;
    if fraction < 0.0 {
        return Err(PsychroError::NegativeRelativeHumidity {
            percent: fraction * 100.0,
        });
    }

    let vapor_pressure = fraction * saturation_pressure_pa(celsius)?;
    let dry_air_pressure = ATMOSPHERIC_PRESSURE - vapor_pressure;
    if dry_air_pressure <= 0.0 {
        return Err(PsychroError::Saturated {
            celsius,
            percent: fraction * 100.0,
        });
    }

    Ok(Ratio::new::<ratio>(MOLAR_MASS_RATIO * vapor_pressure / dry_air_pressure))
}

/// Converts specific humidity into vapor mass fraction (kg vapor per kg moist air).
///
/// # Errors
///
/// Returns a [`PsychroError`] if the humidity is not finite or negative.
pub fn vapor_mass_fraction(specific_humidity: Ratio) -> Result<Ratio, PsychroError> {
    let q = humidity(specific_humidity)?;
    Ok(Ratio::new::<ratio>(q / (1.0 + q)))
}

/// Returns the relative humidity of air at `temperature` holding `specific_humidity`.
///
/// # Errors
///
/// Returns a [`PsychroError`] if an input is not finite, the humidity is
/// negative, or the temperature is outside the saturation correlation's range.
pub fn relative_humidity(
    temperature: ThermodynamicTemperature,
    specific_humidity: Ratio,
) -> Result<Ratio, PsychroError> {
    let celsius = celsius(temperature)?;
    let q = humidity(specific_humidity)?;
    let p_sat = saturation_pressure_pa(celsius)?;
    Ok(Ratio::new::<ratio>(q * ATMOSPHERIC_PRESSURE / ((MOLAR_MASS_RATIO + q) * p_sat)))
}

/// Returns the temperature at which air holding `specific_humidity` saturates.
///
/// # Errors
///
/// Returns a [`PsychroError`] if the humidity is not finite, negative, or zero.
pub fn dew_point(specific_humidity: Ratio) -> Result<ThermodynamicTemperature, PsychroError> {
    let q = humidity(specific_humidity)?;
    if q == 0.0 {
        return Err(PsychroError::DryAir);
    }

    let pressure_ratio = q / (MOLAR_MASS_RATIO + q);
    let celsius = B / (A - pressure_ratio.ln()) - CELSIUS_OFFSET - C;
    Ok(ThermodynamicTemperature::new::<degree_celsius>(celsius))
}

/// Returns the vapor mass fraction of saturated air at `temperature`.
///
/// This is the condensation limit for a surface at that temperature.
///
/// # Errors
///
/// Returns a [`PsychroError`] under the same conditions as [`specific_humidity`].
pub fn saturation_mass_fraction(
    temperature: ThermodynamicTemperature,
) -> Result<Ratio, PsychroError> {
    let q = specific_humidity(temperature, Ratio::new::<ratio>(1.0))?;
    vapor_mass_fraction(q)
}

fn saturation_pressure_pa(celsius: f64) -> Result<f64, PsychroError> {
    let shifted = celsius + CELSIUS_OFFSET + C;
    if shifted <= 0.0 {
        return Err(PsychroError::BelowCorrelationRange { celsius });
    }
    Ok(ATMOSPHERIC_PRESSURE * (A - B / shifted).exp())
}

fn celsius(temperature: ThermodynamicTemperature) -> Result<f64, PsychroError> {
    finite(temperature.get::<degree_celsius>(), "temperature")
}

fn humidity(specific_humidity: Ratio) -> Result<f64, PsychroError> {
    let q = finite(specific_humidity.get::<ratio>(), "specific humidity")?;
    if q < 0.0 {
        return Err(PsychroError::NegativeHumidity { value: q });
    }
    Ok(q)
}

fn finite(value: f64, quantity: &'static str) -> Result<f64, PsychroError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PsychroError::NotFinite { quantity })
    }
}
