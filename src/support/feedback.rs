//! PI(D) feedback loop primitive with back-solving anti-windup.
//!
//! A [`FeedbackLoop`] evaluates the discrete control law
//!
//! ```text
//! u = kp * e + ki * I + kd * de/dt,    I += e * dt
//! ```
//!
//! and carries the integral `I` and the previous error between steps.
//!
//! Anti-windup is algebraic: whenever the emitted output differs from what
//! the control law produced (output clamping, a downstream limit, or another
//! loop winning a selector), [`FeedbackLoop::resolve_integral`] rewrites `I`
//! so the control law reproduces the emitted output exactly. The stored
//! integral therefore always matches the last output that was actually used.
//!
//! # Example
//!
//! ```
//! use cabin_climate::support::{
//!     constraint::StrictlyPositive,
//!     feedback::{FeedbackLoop, Gains, OutputBounds},
//! };
//! use uom::si::{f64::Time, time::second};
//!
//! let mut pi = FeedbackLoop::new(Gains::pi(2.0, 0.5)).unwrap();
//! let bounds = OutputBounds::new(0.0, 1.0).unwrap();
//! let dt = StrictlyPositive::new(Time::new::<second>(1.0)).unwrap();
//!
//! let evaluation = pi.advance(3.0, dt);
//! let output = pi.saturate(&evaluation, bounds);
//!
//! assert_eq!(output, 1.0);
//! assert!((pi.output(evaluation.error, evaluation.derivative) - 1.0).abs() < 1e-12);
//! ```

mod gains;

pub use gains::Gains;

use uom::si::{f64::Time, time::second};

use crate::support::constraint::{Constrained, ConstraintError, NonZero, StrictlyPositive};

/// Closed output range of a loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputBounds {
    min: f64,
    max: f64,
}

impl OutputBounds {
    /// Creates output bounds `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::NotANumber`] if a bound is not finite, or
    /// [`ConstraintError::AboveMaximum`] if `min` exceeds `max`.
    pub fn new(min: f64, max: f64) -> Result<Self, ConstraintError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ConstraintError::NotANumber);
        }
        if min > max {
            return Err(ConstraintError::AboveMaximum);
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamps `value` into the bounds.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Returns `true` if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// State carried by a loop between steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopState {
    /// Accumulated `error * dt`.
    pub integral: f64,
    /// Error from the most recent step, used for the derivative estimate.
    pub previous_error: f64,
}

/// Result of advancing a loop by one step, before any limiting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Error for this step.
    pub error: f64,
    /// Backward-difference derivative of the error.
    pub derivative: f64,
    /// Unlimited control law output.
    pub output: f64,
}

/// A stateful PI(D) loop.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackLoop {
    kp: f64,
    ki: Constrained<f64, NonZero>,
    kd: f64,
    state: LoopState,
}

impl FeedbackLoop {
    /// Creates a loop with zero integral and zero previous error.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if a gain is not finite or the integral
    /// gain is zero.
    pub fn new(gains: Gains) -> Result<Self, ConstraintError> {
        if !(gains.kp.is_finite() && gains.ki.is_finite() && gains.kd.is_finite()) {
            return Err(ConstraintError::NotANumber);
        }
        Ok(Self {
            kp: gains.kp,
            ki: NonZero::new(gains.ki)?,
            kd: gains.kd,
            state: LoopState::default(),
        })
    }

    /// Returns the loop gains.
    #[must_use]
    pub fn gains(&self) -> Gains {
        Gains::pid(self.kp, self.ki(), self.kd)
    }

    /// Returns the current loop state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Advances the loop by one step of length `dt`.
    ///
    /// Integrates `error * dt`, estimates the derivative against the previous
    /// error, and records `error` as the new previous error.
    pub fn advance(&mut self, error: f64, dt: Constrained<Time, StrictlyPositive>) -> Evaluation {
        let dt = dt.into_inner().get::<second>();
        let derivative = (error - self.state.previous_error) / dt;

        self.state.previous_error = error;
        self.state.integral += error * dt;

        Evaluation {
            error,
            derivative,
            output: self.output(error, derivative),
        }
    }

    /// Evaluates the control law for `error` and `derivative` with the stored integral.
    #[must_use]
    pub fn output(&self, error: f64, derivative: f64) -> f64 {
        self.fixed_terms(error, derivative) + self.ki() * self.state.integral
    }

    /// Rewrites the integral so that the control law reproduces `output`.
    ///
    /// The proportional and derivative terms of `evaluation` are held fixed
    /// and the integral is solved for.
    pub fn resolve_integral(&mut self, evaluation: &Evaluation, output: f64) {
        let fixed = self.fixed_terms(evaluation.error, evaluation.derivative);
        self.state.integral = (output - fixed) / self.ki();
    }

    /// Clamps the output of `evaluation` into `bounds`.
    ///
    /// When the output is clamped the integral is resolved from the clamped
    /// value, so it stops winding up while the loop is saturated.
    pub fn saturate(&mut self, evaluation: &Evaluation, bounds: OutputBounds) -> f64 {
        let output = bounds.clamp(evaluation.output);
        if output != evaluation.output {
            self.resolve_integral(evaluation, output);
        }
        output
    }

    fn ki(&self) -> f64 {
        *self.ki.as_ref()
    }

    fn fixed_terms(&self, error: f64, derivative: f64) -> f64 {
        self.kp * error + self.kd * derivative
    }
}
