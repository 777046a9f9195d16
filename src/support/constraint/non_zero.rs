use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is not zero.
///
/// Integral gains carry this constraint, since anti-windup back-solving
/// divides by them. The sign is left free.
///
/// # Examples
///
/// ```
/// use cabin_climate::support::constraint::NonZero;
///
/// let ki = NonZero::new(-5.0).unwrap();
/// assert_eq!(ki.into_inner(), -5.0);
///
/// assert!(NonZero::new(0.0).is_err());
/// assert!(NonZero::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonZero;

impl NonZero {
    /// Constructs a [`Constrained<T, NonZero>`] if the value is not zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is zero or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(value: T) -> Result<Constrained<T, NonZero>, ConstraintError> {
        Constrained::<T, NonZero>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonZero {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater | Ordering::Less) => Ok(()),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_either_sign() {
        assert!(NonZero::new(-0.0003).is_ok());
        assert!(NonZero::new(2.5).is_ok());
    }

    #[test]
    fn rejects_zero_and_nan() {
        assert_eq!(NonZero::new(0.0), Err(ConstraintError::Zero));
        assert_eq!(NonZero::new(-0.0), Err(ConstraintError::Zero));
        assert_eq!(NonZero::new(f64::NAN), Err(ConstraintError::NotANumber));
    }
}
