use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is strictly positive.
///
/// Used for mass flow rates, coupling time steps and heater limits, all of
/// which appear as divisors or ceilings in the control law.
///
/// # Examples
///
/// ```
/// use cabin_climate::support::constraint::StrictlyPositive;
/// use uom::si::{f64::Time, time::second};
///
/// let dt = StrictlyPositive::new(Time::new::<second>(1.0)).unwrap();
/// assert_eq!(dt.into_inner().get::<second>(), 1.0);
///
/// assert!(StrictlyPositive::new(Time::new::<second>(0.0)).is_err());
/// assert!(StrictlyPositive::new(-1.0).is_err());
/// assert!(StrictlyPositive::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs a [`Constrained<T, StrictlyPositive>`] if the value is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is zero, negative, or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, StrictlyPositive>, ConstraintError> {
        Constrained::<T, StrictlyPositive>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for StrictlyPositive {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater) => Ok(()),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{
        f64::{MassRate, Power},
        mass_rate::kilogram_per_second,
        power::watt,
    };

    #[test]
    fn mass_rates() {
        let m_dot = MassRate::new::<kilogram_per_second>(0.083);
        assert!(StrictlyPositive::new(m_dot).is_ok());

        let m_dot = MassRate::new::<kilogram_per_second>(0.0);
        assert_eq!(
            StrictlyPositive::new(m_dot).map(Constrained::into_inner),
            Err(ConstraintError::Zero)
        );
    }

    #[test]
    fn powers() {
        assert!(StrictlyPositive::new(Power::new::<watt>(1e4)).is_ok());
        assert_eq!(
            StrictlyPositive::new(Power::new::<watt>(-1.0)).map(Constrained::into_inner),
            Err(ConstraintError::Negative)
        );
        assert_eq!(
            StrictlyPositive::new(Power::new::<watt>(f64::NAN)).map(Constrained::into_inner),
            Err(ConstraintError::NotANumber)
        );
    }
}
