use bbc_hal::{PdController, Peripherals};
use bbc_types::{Action, RobotState, SensorFrame};
use tracing::trace;

use super::{Behavior, clamp_speed};
use crate::config::WallFollowConfig;

/// PD control on the sonar distance to a wall on the robot's left.
///
/// No trigger: it writes every call, so it only belongs in profiles that
/// mean to follow a wall.  The turn is truncated to an integer before it is
/// applied to the wheels.  Without a valid sonar reading it drives straight
/// at base speed and the PD memory is left alone.
pub struct WallFollow {
    base_speed: i32,
    goal_cm: f32,
    pd: PdController,
}

impl WallFollow {
    pub fn new(config: &WallFollowConfig) -> Self {
        Self {
            base_speed: config.base_speed,
            goal_cm: config.goal_cm,
            pd: PdController::new(config.kp, config.kd),
        }
    }
}

impl Behavior for WallFollow {
    fn name(&self) -> &'static str {
        "wall_follow"
    }

    fn evaluate(&mut self, action: &mut Action, frame: &SensorFrame, _hw: &mut Peripherals) {
        let turn = match frame.sonar_cm() {
            Some(distance) => {
                let error = self.goal_cm - distance;
                let turn = self.pd.update(error) as i32;
                trace!(error, turn, "Wall PD step");
                turn
            }
            None => 0,
        };

        action.state = RobotState::WallFollowing;
        action.speed_left = clamp_speed(self.base_speed - turn);
        action.speed_right = clamp_speed(self.base_speed + turn);
    }
}
