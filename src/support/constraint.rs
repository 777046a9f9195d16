//! Type-level numeric constraints checked once at construction.
//!
//! Controller configuration is full of values that would make the control
//! law divide by zero or produce nonsense if they were allowed through: a
//! zero mass flow rate, a zero integral gain, a non-positive coupling time,
//! an ambient relative humidity of exactly 0 or 1. Wrapping such values in
//! [`Constrained<T, C>`] moves the check to the point where the value enters
//! the crate, so step-time code never has to re-validate it.
//!
//! # Provided constraints
//!
//! - [`NonZero`]: Not equal to zero
//! - [`StrictlyPositive`]: Greater than zero
//! - [`UnitInterval`]: Closed unit interval `0 ≤ x ≤ 1`
//! - [`UnitIntervalOpen`]: Open unit interval `0 < x < 1`
//!
//! Each marker is used with the generic [`Constrained<T, C>`] wrapper and
//! provides an associated `new()` constructor (e.g., `StrictlyPositive::new(0.083)`).

mod non_zero;
mod strictly_positive;
mod unit_interval;

use std::marker::PhantomData;

use thiserror::Error;

pub use non_zero::NonZero;
pub use strictly_positive::StrictlyPositive;
pub use unit_interval::{UnitBounds, UnitInterval, UnitIntervalOpen};

/// A numeric invariant enforced at construction time.
///
/// Implement this trait for a zero-sized marker type to define a new
/// constraint usable with [`Constrained`].
pub trait Constraint<T> {
    /// Checks that the given value satisfies this constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value does not satisfy the constraint.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// An error returned when a [`Constraint`] is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value must not be zero")]
    Zero,
    #[error("value is not a number")]
    NotANumber,
    #[error("value is below the minimum allowed")]
    BelowMinimum,
    #[error("value is above the maximum allowed")]
    AboveMaximum,
}

/// A value known to satisfy the constraint `C`.
///
/// # Example
///
/// ```
/// use cabin_climate::support::constraint::{Constrained, StrictlyPositive};
/// use uom::si::{f64::MassRate, mass_rate::kilogram_per_second};
///
/// let m_dot = MassRate::new::<kilogram_per_second>(0.083);
/// let m_dot = Constrained::<_, StrictlyPositive>::new(m_dot).unwrap();
/// assert_eq!(m_dot.into_inner().get::<kilogram_per_second>(), 0.083);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Constructs a new constrained value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not satisfy the constraint.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Returns a reference to the inner unconstrained value.
impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
