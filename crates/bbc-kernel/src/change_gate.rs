//! [`ChangeGate`] – single interception point between the behaviors and the
//! motor driver.
//!
//! After every behavior has had its turn, the winning [`Action`] is handed to
//! [`ChangeGate::apply`].  The gate compares it with the last action it
//! successfully forwarded and only talks to the motors when something
//! differs:
//!
//! 1. **Acceleration** – `set_acceleration(accel_left, accel_right)`.
//! 2. **Speed** – `run(speed_left, speed_right)`.
//!
//! The snapshot is updated only after both commands succeed, so a failed
//! write is retried on the next iteration.
//!
//! # Example
//!
//! ```
//! use bbc_hal::sim::SimWorld;
//! use bbc_kernel::ChangeGate;
//! use bbc_types::{Action, RobotState};
//!
//! let world = SimWorld::new();
//! let mut hw = world.peripherals();
//! let mut gate = ChangeGate::new();
//!
//! let cruise = Action::new(RobotState::Cruising, 200, 200, 400, 400);
//! assert!(gate.apply(&cruise, &mut hw));
//! // Same action again → nothing reaches the motors.
//! assert!(!gate.apply(&cruise, &mut hw));
//! assert_eq!(world.motor_calls().len(), 2);
//! ```

use bbc_hal::Peripherals;
use bbc_types::{Action, BbcError};
use tracing::{debug, error};

/// Forwards an [`Action`] to the motor driver only when it changed.
#[derive(Debug, Default, Clone)]
pub struct ChangeGate {
    applied: Action,
}

impl ChangeGate {
    /// A gate whose snapshot is the reset action (`Startup`, all zeros).
    pub fn new() -> Self {
        Self::default()
    }

    /// The last action successfully forwarded to the motors.
    pub fn applied(&self) -> &Action {
        &self.applied
    }

    /// Forward `action` to the motors if it differs from the snapshot.
    ///
    /// Returns `true` when the motors were commanded.  A motor fault is
    /// logged and leaves the snapshot untouched; it never stops the loop.
    pub fn apply(&mut self, action: &Action, hw: &mut Peripherals) -> bool {
        if *action == self.applied {
            return false;
        }
        match Self::actuate(action, hw) {
            Ok(()) => {
                debug!(
                    state = ?action.state,
                    speed_left = action.speed_left,
                    speed_right = action.speed_right,
                    accel_left = action.accel_left,
                    accel_right = action.accel_right,
                    "Motor command applied"
                );
                self.applied = *action;
                true
            }
            Err(e) => {
                error!(error = %e, state = ?action.state, "Motor command rejected");
                false
            }
        }
    }

    /// Forget the snapshot so the next [`apply`][Self::apply] always actuates
    /// unless the action equals the reset action.
    pub fn reset(&mut self) {
        self.applied.reset();
    }

    fn actuate(action: &Action, hw: &mut Peripherals) -> Result<(), BbcError> {
        hw.motors
            .set_acceleration(action.accel_left, action.accel_right)?;
        hw.motors.run(action.speed_left, action.speed_right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbc_hal::sim::{MotorCall, SimWorld};
    use bbc_types::RobotState;

    fn cruise() -> Action {
        Action::new(RobotState::Cruising, 200, 200, 400, 400)
    }

    #[test]
    fn first_differing_action_sets_accel_then_speed() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut gate = ChangeGate::new();

        assert!(gate.apply(&cruise(), &mut hw));
        assert_eq!(
            world.motor_calls(),
            vec![
                MotorCall::SetAcceleration { left: 400, right: 400 },
                MotorCall::Run { left: 200, right: 200 },
            ]
        );
        assert_eq!(*gate.applied(), cruise());
    }

    #[test]
    fn unchanged_action_is_idempotent() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut gate = ChangeGate::new();

        gate.apply(&cruise(), &mut hw);
        for _ in 0..10 {
            assert!(!gate.apply(&cruise(), &mut hw));
        }
        assert_eq!(world.motor_calls().len(), 2);
    }

    #[test]
    fn reset_action_matches_initial_snapshot() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut gate = ChangeGate::new();

        assert!(!gate.apply(&Action::default(), &mut hw));
        assert!(world.motor_calls().is_empty());
    }

    #[test]
    fn state_only_change_still_actuates() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut gate = ChangeGate::new();

        gate.apply(&cruise(), &mut hw);
        world.take_motor_calls();

        let homing = Action {
            state: RobotState::Homing,
            ..cruise()
        };
        assert!(gate.apply(&homing, &mut hw));
        assert_eq!(world.motor_calls().len(), 2);
    }

    #[test]
    fn motor_fault_keeps_snapshot_and_retries() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut gate = ChangeGate::new();

        world.fail_motors(Some("driver offline".into()));
        assert!(!gate.apply(&cruise(), &mut hw));
        assert_eq!(*gate.applied(), Action::default());

        world.fail_motors(None);
        assert!(gate.apply(&cruise(), &mut hw));
        assert_eq!(world.motor_calls().len(), 2);
    }

    #[test]
    fn reset_forces_reapply() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut gate = ChangeGate::new();

        gate.apply(&cruise(), &mut hw);
        gate.reset();
        assert!(gate.apply(&cruise(), &mut hw));
        assert_eq!(world.motor_calls().len(), 4);
    }
}
