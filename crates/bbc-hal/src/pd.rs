//! One-step PD (Proportional–Derivative) controller.
//!
//! The derivative is a plain finite difference between consecutive calls,
//! not a rate: the controller is ticked once per arbitration loop iteration
//! and the gains are tuned for that cadence.
//!
//! # Example
//!
//! ```rust
//! use bbc_hal::pd::PdController;
//!
//! let mut pd = PdController::new(0.5, 1.5);
//! // previous error starts at zero, so the first derivative equals the error.
//! let turn = pd.update(10.0);
//! assert!((turn - 20.0).abs() < 1e-6);
//! ```

/// A PD controller with error memory of one iteration.
#[derive(Debug, Clone)]
pub struct PdController {
    kp: f32,
    kd: f32,
    last_error: f32,
}

impl PdController {
    /// Create a controller whose previous error is zero.
    pub fn new(kp: f32, kd: f32) -> Self {
        Self {
            kp,
            kd,
            last_error: 0.0,
        }
    }

    pub fn set_gains(&mut self, kp: f32, kd: f32) {
        self.kp = kp;
        self.kd = kd;
    }

    /// Compute `kp·error + kd·(error − previous_error)` and remember `error`.
    pub fn update(&mut self, error: f32) -> f32 {
        let derivative = error - self.last_error;
        self.last_error = error;
        self.kp * error + self.kd * derivative
    }

    /// The error passed to the most recent [`update`][Self::update].
    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    /// Forget the previous error.
    pub fn reset(&mut self) {
        self.last_error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only_scales_error() {
        let mut pd = PdController::new(2.0, 0.0);
        assert!((pd.update(10.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn wall_follow_reference_case() {
        // goal 50.34, measured 40 → error 10.34, derivative 10.34.
        let mut pd = PdController::new(0.5, 1.5);
        let turn = pd.update(50.34 - 40.0);
        assert!((turn - 20.68).abs() < 1e-3);
        assert!((pd.last_error() - 10.34).abs() < 1e-4);
    }

    #[test]
    fn derivative_uses_previous_error() {
        let mut pd = PdController::new(0.0, 1.0);
        pd.update(4.0);
        // derivative = 1 - 4 = -3
        assert!((pd.update(1.0) - (-3.0)).abs() < 1e-6);
        // steady error → zero derivative
        assert!(pd.update(1.0).abs() < 1e-6);
    }

    #[test]
    fn reset_clears_memory() {
        let mut pd = PdController::new(1.0, 1.0);
        pd.update(5.0);
        pd.reset();
        let mut fresh = PdController::new(1.0, 1.0);
        assert!((pd.update(2.0) - fresh.update(2.0)).abs() < 1e-6);
    }

    #[test]
    fn set_gains_updates_behavior() {
        let mut pd = PdController::new(1.0, 0.0);
        pd.set_gains(3.0, 0.0);
        assert!((pd.update(10.0) - 30.0).abs() < 1e-4);
    }
}
