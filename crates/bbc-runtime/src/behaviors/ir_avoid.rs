use bbc_hal::{Brake, Peripherals, StepMove, Wheels};
use bbc_types::{Action, BbcError, RobotState, SensorFrame};
use tracing::{info, warn};

use super::Behavior;
use crate::config::IrAvoidConfig;

/// Ballistic escape from an IR proximity trip.
///
/// Stop, back off, turn in place away from the obstacle, then leave a
/// forward command in the action.  The whole maneuver blocks the loop and
/// always runs to the end; a failed leg is logged and the next leg still
/// runs.  A trip on both sides backs off further and turns further (left).
pub struct IrAvoid {
    config: IrAvoidConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trip {
    Both,
    Left,
    Right,
}

impl IrAvoid {
    pub fn new(config: &IrAvoidConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn trip(frame: &SensorFrame) -> Option<Trip> {
        match (frame.left_ir, frame.right_ir) {
            (true, true) => Some(Trip::Both),
            (true, false) => Some(Trip::Left),
            (false, true) => Some(Trip::Right),
            (false, false) => None,
        }
    }

    fn leg(&self, steps: u16, forward: bool) -> StepMove {
        let c = &self.config;
        if forward {
            StepMove::forward(steps, c.maneuver_speed, c.maneuver_accel)
        } else {
            StepMove::reverse(steps, c.maneuver_speed, c.maneuver_accel)
        }
    }

    fn maneuver(&self, trip: Trip, hw: &mut Peripherals) {
        let c = &self.config;
        let (back, turn, turn_left) = match trip {
            Trip::Both => (c.reverse_steps_both, c.escape_turn_steps, true),
            // Obstacle on the left: turn right.
            Trip::Left => (c.reverse_steps, c.quarter_turn_steps, false),
            Trip::Right => (c.reverse_steps, c.quarter_turn_steps, true),
        };

        log_leg("stop", hw.motors.stop(Wheels::Both, Brake::Off));
        log_leg(
            "reverse",
            hw.motors
                .move_blocking(Wheels::Both, self.leg(back, false), self.leg(back, false)),
        );
        // In-place turn: the wheels spin in opposite directions.
        log_leg(
            "turn",
            hw.motors
                .move_blocking(Wheels::Both, self.leg(turn, !turn_left), self.leg(turn, turn_left)),
        );
    }
}

fn log_leg(leg: &'static str, result: Result<(), BbcError>) {
    if let Err(e) = result {
        warn!(leg, error = %e, "IR escape leg failed; continuing maneuver");
    }
}

impl Behavior for IrAvoid {
    fn name(&self) -> &'static str {
        "ir_avoid"
    }

    fn announces(&self, frame: &SensorFrame) -> Option<RobotState> {
        Self::trip(frame).map(|_| RobotState::IrAvoiding)
    }

    fn evaluate(&mut self, action: &mut Action, frame: &SensorFrame, hw: &mut Peripherals) {
        let Some(trip) = Self::trip(frame) else {
            return;
        };
        info!(?trip, "IR obstacle; running escape maneuver");
        self.maneuver(trip, hw);

        let c = &self.config;
        *action = Action::new(
            RobotState::IrAvoiding,
            c.forward_speed,
            c.forward_speed,
            c.forward_accel,
            c.forward_accel,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbc_hal::Direction;
    use bbc_hal::sim::{MotorCall, SimWorld};
    use std::time::Duration;

    fn tripped(left: bool, right: bool) -> SensorFrame {
        SensorFrame {
            left_ir: left,
            right_ir: right,
            ..SensorFrame::default()
        }
    }

    fn moves(calls: &[MotorCall]) -> Vec<(StepMove, StepMove)> {
        calls
            .iter()
            .filter_map(|c| match c {
                MotorCall::Move { left, right, .. } => Some((*left, *right)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn clear_sensors_do_nothing() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut avoid = IrAvoid::new(&IrAvoidConfig::default());
        let mut action = Action::new(RobotState::Cruising, 200, 200, 400, 400);

        avoid.evaluate(&mut action, &tripped(false, false), &mut hw);
        assert_eq!(action.state, RobotState::Cruising);
        assert!(world.motor_calls().is_empty());
    }

    #[test]
    fn left_trip_backs_off_and_turns_right() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut avoid = IrAvoid::new(&IrAvoidConfig::default());
        let mut action = Action::new(RobotState::Cruising, 200, 200, 400, 400);

        avoid.evaluate(&mut action, &tripped(true, false), &mut hw);

        let calls = world.motor_calls();
        assert_eq!(
            calls[0],
            MotorCall::Stop {
                which: Wheels::Both,
                brake: Brake::Off
            }
        );
        let legs = moves(&calls);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].0, StepMove::reverse(250, 200, 400));
        assert_eq!(legs[0].1, StepMove::reverse(250, 200, 400));
        assert_eq!(legs[1].0.direction, Direction::Forward);
        assert_eq!(legs[1].1.direction, Direction::Reverse);
        assert_eq!(legs[1].0.steps, 135);

        assert_eq!(action, Action::new(RobotState::IrAvoiding, 200, 200, 400, 400));
    }

    #[test]
    fn right_trip_turns_left() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut avoid = IrAvoid::new(&IrAvoidConfig::default());
        let mut action = Action::default();

        avoid.evaluate(&mut action, &tripped(false, true), &mut hw);
        let legs = moves(&world.motor_calls());
        assert_eq!(legs[1].0.direction, Direction::Reverse);
        assert_eq!(legs[1].1.direction, Direction::Forward);
        assert_eq!(legs[1].1.steps, 135);
    }

    #[test]
    fn both_trip_backs_further_and_turns_further() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut avoid = IrAvoid::new(&IrAvoidConfig::default());
        let mut action = Action::default();

        avoid.evaluate(&mut action, &tripped(true, true), &mut hw);
        let legs = moves(&world.motor_calls());
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].0.steps, 500);
        assert_eq!(legs[1].0, StepMove::reverse(175, 200, 400));
        assert_eq!(legs[1].1, StepMove::forward(175, 200, 400));
    }

    #[test]
    fn maneuver_blocks_for_its_duration() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut avoid = IrAvoid::new(&IrAvoidConfig::default());
        let mut action = Action::default();

        avoid.evaluate(&mut action, &tripped(true, false), &mut hw);
        // 250 steps + 135 steps at 200 steps/s
        assert_eq!(world.now(), Duration::from_millis(1250 + 675));
    }

    #[test]
    fn failed_leg_does_not_cancel_maneuver() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut avoid = IrAvoid::new(&IrAvoidConfig::default());
        let mut action = Action::default();

        world.fail_motors(Some("stalled".into()));
        avoid.evaluate(&mut action, &tripped(false, true), &mut hw);
        assert_eq!(action, Action::new(RobotState::IrAvoiding, 200, 200, 400, 400));
    }
}
