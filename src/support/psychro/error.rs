use thiserror::Error;

/// Errors raised when a psychrometric relation is evaluated outside its domain.
///
/// These are reported instead of letting infinities or `NaN` leak into the
/// control outputs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PsychroError {
    /// An input was `NaN` or infinite.
    #[error("non-finite {quantity}")]
    NotFinite { quantity: &'static str },

    /// The temperature is at or below the pole of the saturation correlation.
    #[error("temperature {celsius} °C is below the saturation correlation's range")]
    BelowCorrelationRange { celsius: f64 },

    /// Relative humidity was negative.
    #[error("relative humidity {percent} % is negative")]
    NegativeRelativeHumidity { percent: f64 },

    /// The partial pressure of vapor reached the total pressure.
    ///
    /// Happens when a high relative humidity is combined with a temperature
    /// near boiling, which drives the specific-humidity denominator to zero.
    #[error("vapor pressure reaches total pressure at {celsius} °C and {percent} % RH")]
    Saturated { celsius: f64, percent: f64 },

    /// Specific humidity was negative.
    #[error("specific humidity {value} kg/kg is negative")]
    NegativeHumidity { value: f64 },

    /// Dew point requested for perfectly dry air.
    #[error("dew point is undefined for dry air")]
    DryAir,
}
