use bbc_hal::Peripherals;
use bbc_types::{Action, RobotState, SensorFrame};

use super::{Behavior, to_speed};
use crate::config::SonarAvoidConfig;

/// Veers right, harder the closer the sonar contact.
pub struct SonarAvoid {
    base_speed: f32,
    trigger_cm: f32,
}

impl SonarAvoid {
    pub fn new(config: &SonarAvoidConfig) -> Self {
        Self {
            base_speed: config.base_speed,
            trigger_cm: config.trigger_cm,
        }
    }
}

impl Behavior for SonarAvoid {
    fn name(&self) -> &'static str {
        "sonar_avoid"
    }

    fn evaluate(&mut self, action: &mut Action, frame: &SensorFrame, _hw: &mut Peripherals) {
        let Some(distance) = frame.sonar_cm() else {
            return;
        };
        if distance >= self.trigger_cm {
            return;
        }
        let deficit = self.trigger_cm - distance;
        action.state = RobotState::SonarAvoiding;
        action.speed_left = to_speed(self.base_speed + deficit);
        action.speed_right = to_speed(self.base_speed - deficit);
    }
}
