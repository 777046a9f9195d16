use thiserror::Error;

use crate::{
    models::hvac::recirculation::TuningError,
    support::{constraint::ConstraintError, psychro::PsychroError},
};

use super::Probe;

/// Errors raised while reading host measurements.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MeasurementError {
    /// The host did not provide a required measurement.
    #[error("measurement {probe} is unavailable")]
    Unavailable { probe: Probe },

    /// The host provided `NaN` or an infinite value.
    #[error("measurement {probe} is not finite: {value}")]
    NotFinite { probe: Probe, value: f64 },

    /// The coupling time step was not strictly positive.
    #[error("time step must be positive")]
    TimeStep(#[from] ConstraintError),
}

/// Errors raised while constructing a [`ClimateController`](super::ClimateController).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// A configured quantity violates its constraint.
    #[error("invalid {field}")]
    Constraint {
        field: &'static str,
        #[source]
        source: ConstraintError,
    },

    /// The recirculation loops could not be tuned.
    #[error("recirculation tuning failed")]
    Tuning(#[from] TuningError),
}

impl ConfigError {
    pub(super) fn field(field: &'static str) -> impl FnOnce(ConstraintError) -> Self {
        move |source| Self::Constraint { field, source }
    }
}

/// Errors raised by a single control step.
///
/// A failed step leaves the controller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StepError {
    /// A host reading was missing or invalid.
    #[error("measurement failed")]
    Measurement(#[from] MeasurementError),

    /// The vapor setpoint could not be derived from the glass temperature.
    #[error("psychrometric evaluation failed")]
    Psychro(#[from] PsychroError),
}
