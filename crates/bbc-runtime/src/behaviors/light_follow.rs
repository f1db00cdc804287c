use bbc_hal::Peripherals;
use bbc_hal::sensors::ADC_REFERENCE_VOLTS;
use bbc_types::{Action, RobotState, SensorFrame};

use super::{Behavior, to_speed};
use crate::config::LightFollowConfig;

/// Proportional steering towards the brighter photoresistor.
///
/// Each side's brightness is normalised to the headroom between its ambient
/// baseline and full scale.  The behavior only triggers once the mean raw
/// voltage clears `ambient + threshold_fraction · headroom`.  Only the state
/// and speeds are written; the acceleration ramp is left as found.
pub struct LightFollow {
    base_speed: f32,
    threshold_fraction: f32,
}

impl LightFollow {
    pub fn new(config: &LightFollowConfig) -> Self {
        Self {
            base_speed: config.base_speed,
            threshold_fraction: config.threshold_fraction,
        }
    }

    /// Brightness above ambient as a fraction of the available headroom.
    /// Readings below ambient clamp to zero, as does a saturated baseline.
    fn normalized(voltage: f32, ambient: f32) -> f32 {
        let adjusted = (voltage - ambient).max(0.0);
        let headroom = ADC_REFERENCE_VOLTS - ambient;
        if headroom <= 0.0 { 0.0 } else { adjusted / headroom }
    }

    fn threshold(&self, frame: &SensorFrame) -> f32 {
        let ambient = (frame.left_photo_ambient + frame.right_photo_ambient) / 2.0;
        (ADC_REFERENCE_VOLTS - ambient) * self.threshold_fraction + ambient
    }
}

impl Behavior for LightFollow {
    fn name(&self) -> &'static str {
        "light_follow"
    }

    fn evaluate(&mut self, action: &mut Action, frame: &SensorFrame, _hw: &mut Peripherals) {
        let mean = (frame.left_photo_voltage + frame.right_photo_voltage) / 2.0;
        if mean <= self.threshold(frame) {
            return;
        }
        let left = Self::normalized(frame.left_photo_voltage, frame.left_photo_ambient);
        let right = Self::normalized(frame.right_photo_voltage, frame.right_photo_ambient);
        let delta = right - left;

        action.state = RobotState::Homing;
        action.speed_left = to_speed(self.base_speed * (1.0 + delta));
        action.speed_right = to_speed(self.base_speed * (1.0 - delta));
    }
}
