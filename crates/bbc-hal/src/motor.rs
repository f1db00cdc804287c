//! Generic `MotorDriver` trait for the twin stepper drive.
//!
//! Two ways of moving are exposed.  The free-running pair
//! ([`MotorDriver::set_acceleration`] + [`MotorDriver::run`]) returns
//! immediately and is what the change gate uses every time the winning
//! action changes.  [`MotorDriver::move_blocking`] runs a fixed number of
//! steps and only returns once both wheels have finished; it is reserved for
//! ballistic behaviors that are allowed to hold the control loop.

use bbc_types::BbcError;

/// Which wheel(s) a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheels {
    Left,
    Right,
    Both,
}

/// What the driver does with the coils once a wheel stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Brake {
    /// Release the coils and let the wheel coast.
    #[default]
    Off,
    /// Keep the coils energised and hold position.
    On,
}

/// Rotation sense of a single wheel for a blocking move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// One wheel's half of a blocking move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMove {
    pub direction: Direction,
    pub steps: u16,
    /// Steps per second.
    pub speed: u16,
    /// Steps per second squared.
    pub accel: u16,
    pub brake: Brake,
}

impl StepMove {
    pub fn forward(steps: u16, speed: u16, accel: u16) -> Self {
        Self {
            direction: Direction::Forward,
            steps,
            speed,
            accel,
            brake: Brake::Off,
        }
    }

    pub fn reverse(steps: u16, speed: u16, accel: u16) -> Self {
        Self {
            direction: Direction::Reverse,
            ..Self::forward(steps, speed, accel)
        }
    }

    /// Nominal time the move takes at cruise speed, in seconds.
    pub fn nominal_secs(&self) -> f64 {
        if self.speed == 0 {
            0.0
        } else {
            f64::from(self.steps) / f64::from(self.speed)
        }
    }
}

/// A differential pair of stepper motors.
pub trait MotorDriver {
    /// Set the acceleration ramp used by subsequent [`run`][Self::run] calls.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::HardwareFault`] if the driver rejects the command.
    fn set_acceleration(&mut self, left: u16, right: u16) -> Result<(), BbcError>;

    /// Free-run both wheels.  The sign of each speed selects its direction.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::HardwareFault`] if the driver rejects the command.
    fn run(&mut self, speed_left: i16, speed_right: i16) -> Result<(), BbcError>;

    /// Stop `which` wheel(s).
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::HardwareFault`] if the driver rejects the command.
    fn stop(&mut self, which: Wheels, brake: Brake) -> Result<(), BbcError>;

    /// Run a fixed number of steps on `which` wheel(s) and wait for completion.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::HardwareFault`] if the move could not be completed.
    fn move_blocking(
        &mut self,
        which: Wheels,
        left: StepMove,
        right: StepMove,
    ) -> Result<(), BbcError>;
}
