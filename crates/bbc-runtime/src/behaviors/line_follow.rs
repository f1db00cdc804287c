use bbc_hal::{PdController, Peripherals};
use bbc_types::{Action, RobotState, SensorFrame};
use tracing::info;

use super::{Behavior, clamp_speed};
use crate::config::LineFollowConfig;

/// Hysteresis-gated PD tracking of a reflective line.
///
/// Low voltage means high reflectance.  Following starts once both channels
/// read below `line_threshold` (the right channel after removing its
/// calibration offset) and stops once both raw channels read above
/// `exit_threshold`.  Readings in between keep the current mode.  The PD
/// memory only advances while following.
pub struct LineFollow {
    base_speed: i32,
    line_threshold: f32,
    exit_threshold: f32,
    right_offset: f32,
    following: bool,
    pd: PdController,
}

impl LineFollow {
    pub fn new(config: &LineFollowConfig) -> Self {
        Self {
            base_speed: config.base_speed,
            line_threshold: config.line_threshold,
            exit_threshold: config.exit_threshold,
            right_offset: config.right_offset,
            following: false,
            pd: PdController::new(config.kp, config.kd),
        }
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    fn update_mode(&mut self, left: f32, right: f32) {
        let was = self.following;
        if left > self.exit_threshold && right > self.exit_threshold {
            self.following = false;
        }
        if left < self.line_threshold && right - self.right_offset < self.line_threshold {
            self.following = true;
        }
        if was != self.following {
            info!(following = self.following, left, right, "Line tracking mode changed");
        }
    }
}

impl Behavior for LineFollow {
    fn name(&self) -> &'static str {
        "line_follow"
    }

    fn evaluate(&mut self, action: &mut Action, frame: &SensorFrame, _hw: &mut Peripherals) {
        let left = frame.left_line_voltage;
        let right = frame.right_line_voltage;
        self.update_mode(left, right);
        if !self.following {
            return;
        }

        let error = left - (right - self.right_offset);
        let turn = self.pd.update(error) as i32;

        action.state = RobotState::LineFollowing;
        action.speed_left = clamp_speed(self.base_speed + turn);
        action.speed_right = clamp_speed(self.base_speed - turn);
    }
}
