/// Proportional, integral and derivative gains of a feedback loop.
///
/// Gains are plain configuration values. They are validated when a
/// [`FeedbackLoop`](super::FeedbackLoop) is constructed: all gains must be
/// finite and the integral gain must be non-zero, since anti-windup divides
/// by it.
///
/// Signs are kept as given. A negative gain is a valid way to express a loop
/// whose manipulated variable drives the error toward zero from above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
}

impl Gains {
    /// Gains for a loop without derivative action.
    #[must_use]
    pub fn pi(kp: f64, ki: f64) -> Self {
        Self { kp, ki, kd: 0.0 }
    }

    /// Gains for a full PID loop.
    #[must_use]
    pub fn pid(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}
