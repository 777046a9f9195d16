use std::{cmp::Ordering, marker::PhantomData};

use uom::si::{f64::Ratio, ratio::ratio};

use super::{Constrained, Constraint, ConstraintError};

/// Supplies 0 and 1 for types used with the unit interval constraints.
pub trait UnitBounds: PartialOrd {
    fn zero() -> Self;
    fn one() -> Self;
}

impl UnitBounds for f64 {
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
}

impl UnitBounds for Ratio {
    fn zero() -> Self {
        Ratio::new::<ratio>(0.0)
    }
    fn one() -> Self {
        Ratio::new::<ratio>(1.0)
    }
}

/// Marker type enforcing that a value lies in the closed unit interval: `0 ≤ x ≤ 1`.
///
/// Recirculation ratios carry this constraint.
///
/// # Examples
///
/// ```
/// use cabin_climate::support::constraint::UnitInterval;
/// use uom::si::{f64::Ratio, ratio::{percent, ratio}};
///
/// let recirc = UnitInterval::new(Ratio::new::<ratio>(0.45)).unwrap();
/// assert_eq!(recirc.as_ref().get::<percent>(), 45.0);
///
/// assert!(UnitInterval::new(Ratio::new::<ratio>(1.2)).is_err());
/// assert!(UnitInterval::new(-0.1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitInterval;

impl UnitInterval {
    /// Constructs `Constrained<T, UnitInterval>` if 0 ≤ value ≤ 1.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::BelowMinimum`] if less than zero.
    /// - [`ConstraintError::AboveMaximum`] if greater than one.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: UnitBounds>(value: T) -> Result<Constrained<T, UnitInterval>, ConstraintError> {
        Constrained::<T, UnitInterval>::new(value)
    }

    /// Returns the lower bound (zero) as a constrained value.
    #[must_use]
    pub fn zero<T: UnitBounds>() -> Constrained<T, UnitInterval> {
        Constrained::<T, UnitInterval> {
            value: T::zero(),
            _marker: PhantomData,
        }
    }
}

impl<T: UnitBounds> Constraint<T> for UnitInterval {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match (value.partial_cmp(&T::zero()), value.partial_cmp(&T::one())) {
            (None, _) | (_, None) => Err(ConstraintError::NotANumber),
            (Some(Ordering::Less), _) => Err(ConstraintError::BelowMinimum),
            (_, Some(Ordering::Greater)) => Err(ConstraintError::AboveMaximum),
            _ => Ok(()),
        }
    }
}

/// Marker type enforcing that a value lies in the open unit interval: `0 < x < 1`.
///
/// Ambient relative humidity carries this constraint: perfectly dry air has
/// no dew point and saturated air leaves no humidity margin to tune against.
///
/// # Examples
///
/// ```
/// use cabin_climate::support::constraint::UnitIntervalOpen;
/// use uom::si::{f64::Ratio, ratio::ratio};
///
/// assert!(UnitIntervalOpen::new(Ratio::new::<ratio>(0.7)).is_ok());
/// assert!(UnitIntervalOpen::new(Ratio::new::<ratio>(0.0)).is_err());
/// assert!(UnitIntervalOpen::new(Ratio::new::<ratio>(1.0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitIntervalOpen;

impl UnitIntervalOpen {
    /// Constructs `Constrained<T, UnitIntervalOpen>` if 0 < value < 1.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::BelowMinimum`] if less than or equal to zero.
    /// - [`ConstraintError::AboveMaximum`] if greater than or equal to one.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: UnitBounds>(
        value: T,
    ) -> Result<Constrained<T, UnitIntervalOpen>, ConstraintError> {
        Constrained::<T, UnitIntervalOpen>::new(value)
    }
}

impl<T: UnitBounds> Constraint<T> for UnitIntervalOpen {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match (value.partial_cmp(&T::zero()), value.partial_cmp(&T::one())) {
            (None, _) | (_, None) => Err(ConstraintError::NotANumber),
            (Some(Ordering::Less | Ordering::Equal), _) => Err(ConstraintError::BelowMinimum),
            (_, Some(Ordering::Greater | Ordering::Equal)) => Err(ConstraintError::AboveMaximum),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn closed_accepts_endpoints() {
        assert!(UnitInterval::new(0.0).is_ok());
        assert!(UnitInterval::new(1.0).is_ok());
        assert_eq!(UnitInterval::zero::<f64>().into_inner(), 0.0);
    }

    #[test]
    fn closed_rejects_out_of_range() {
        assert_eq!(
            UnitInterval::new(Ratio::new::<ratio>(-1e-15)).map(Constrained::into_inner),
            Err(ConstraintError::BelowMinimum)
        );
        assert_eq!(
            UnitInterval::new(Ratio::new::<ratio>(1.0 + 1e-15)).map(Constrained::into_inner),
            Err(ConstraintError::AboveMaximum)
        );
        assert_eq!(
            UnitInterval::new(f64::NAN).map(Constrained::into_inner),
            Err(ConstraintError::NotANumber)
        );
    }

    #[test]
    fn open_rejects_endpoints() {
        assert!(UnitIntervalOpen::new(Ratio::new::<ratio>(0.7)).is_ok());
        assert_eq!(
            UnitIntervalOpen::new(0.0).map(Constrained::into_inner),
            Err(ConstraintError::BelowMinimum)
        );
        assert_eq!(
            UnitIntervalOpen::new(1.0).map(Constrained::into_inner),
            Err(ConstraintError::AboveMaximum)
        );
    }
}
