//! Behaviors – independent control laws competing for the shared [`Action`].
//!
//! The arbiter calls every behavior once per iteration in ascending priority
//! order.  A behavior whose trigger holds overwrites the fields it owns; one
//! whose trigger does not hold leaves the action untouched.  Whatever the last
//! writer left behind is what the change gate sees.
//!
//! Behaviors only read the [`SensorFrame`].  They are handed the
//! [`Peripherals`] for the few side effects they own: the ballistic IR escape
//! maneuver, audio cues, and lowering the blob tracker's edge.

use bbc_hal::Peripherals;
use bbc_types::{Action, RobotState, SensorFrame};

mod blob_follow;
mod cruise;
mod ir_avoid;
mod light_follow;
mod line_follow;
mod sonar_avoid;
mod wall_follow;

pub use blob_follow::BlobFollow;
pub use cruise::Cruise;
pub use ir_avoid::IrAvoid;
pub use light_follow::LightFollow;
pub use line_follow::LineFollow;
pub use sonar_avoid::SonarAvoid;
pub use wall_follow::WallFollow;

pub trait Behavior {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Overwrite `action` if this behavior's trigger holds.
    fn evaluate(&mut self, action: &mut Action, frame: &SensorFrame, hw: &mut Peripherals);

    /// The state a blocking maneuver is about to enter, if `evaluate` would
    /// hold the loop for `frame`.  The arbiter shows it before the loop
    /// blocks.
    fn announces(&self, _frame: &SensorFrame) -> Option<RobotState> {
        None
    }
}

/// Truncate toward zero and saturate into the motor command range.
pub(crate) fn to_speed(value: f32) -> i16 {
    // `as` saturates for floats and maps NaN to 0.
    value as i16
}

pub(crate) fn clamp_speed(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_speeds_truncate_toward_zero() {
        assert_eq!(to_speed(229.9), 229);
        assert_eq!(to_speed(-12.7), -12);
        assert_eq!(to_speed(f32::NAN), 0);
        assert_eq!(to_speed(1.0e9), i16::MAX);
    }

    #[test]
    fn integer_speeds_saturate() {
        assert_eq!(clamp_speed(150), 150);
        assert_eq!(clamp_speed(100_000), i16::MAX);
        assert_eq!(clamp_speed(-100_000), i16::MIN);
    }
}
