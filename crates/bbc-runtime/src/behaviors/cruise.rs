use bbc_hal::Peripherals;
use bbc_types::{Action, RobotState, SensorFrame};

use super::Behavior;
use crate::config::CruiseConfig;

/// Baseline forward command.  Always writes, so it must sit at the bottom of
/// the priority list.
pub struct Cruise {
    speed: i16,
    accel: u16,
}

impl Cruise {
    pub fn new(config: &CruiseConfig) -> Self {
        Self {
            speed: config.speed,
            accel: config.accel,
        }
    }
}

impl Behavior for Cruise {
    fn name(&self) -> &'static str {
        "cruise"
    }

    fn evaluate(&mut self, action: &mut Action, _frame: &SensorFrame, _hw: &mut Peripherals) {
        *action = Action::new(
            RobotState::Cruising,
            self.speed,
            self.speed,
            self.accel,
            self.accel,
        );
    }
}
