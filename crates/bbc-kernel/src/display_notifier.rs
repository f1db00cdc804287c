//! [`DisplayNotifier`] – shows the current [`RobotState`] on the LCD.
//!
//! The display is slow and flickers when rewritten, so the label is only
//! rendered when the state differs from the one shown last.

use bbc_hal::Peripherals;
use bbc_types::RobotState;
use tracing::info;

/// Fixed LCD text for every state.
pub fn state_label(state: RobotState) -> &'static str {
    match state {
        RobotState::Startup => "STARTING...",
        RobotState::Cruising => "CRUISING...",
        RobotState::Homing => "HOMING...",
        RobotState::IrAvoiding => "IR AVOIDING...",
        RobotState::SonarAvoiding => "SONAR AVOIDING...",
        RobotState::WallFollowing => "WALL FOLLOWING...",
        RobotState::LineFollowing => "LINE FOLLOWING...",
        RobotState::BlobFollowing => "FOLLOWING...",
    }
}

/// Renders the state label once per transition.
#[derive(Debug, Default, Clone)]
pub struct DisplayNotifier {
    shown: Option<RobotState>,
}

impl DisplayNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state whose label is currently on the display, if any.
    pub fn shown(&self) -> Option<RobotState> {
        self.shown
    }

    /// Clear the LCD and print the label for `state` unless it is already
    /// shown.  Returns `true` when the display was rewritten.
    pub fn notify(&mut self, state: RobotState, hw: &mut Peripherals) -> bool {
        if self.shown == Some(state) {
            return false;
        }
        let label = state_label(state);
        hw.display.clear();
        hw.display.print(label);
        info!(?state, label, "Robot state changed");
        self.shown = Some(state);
        true
    }

    /// Forget what is on the display so the next state is always rendered.
    pub fn invalidate(&mut self) {
        self.shown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbc_hal::sim::{DisplayOp, SimWorld};

    #[test]
    fn first_state_is_always_rendered() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut notifier = DisplayNotifier::new();

        assert!(notifier.notify(RobotState::Startup, &mut hw));
        assert_eq!(
            world.display_ops(),
            vec![DisplayOp::Clear, DisplayOp::Print("STARTING...".into())]
        );
    }

    #[test]
    fn repeated_state_is_not_rerendered() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut notifier = DisplayNotifier::new();

        notifier.notify(RobotState::Cruising, &mut hw);
        assert!(!notifier.notify(RobotState::Cruising, &mut hw));
        assert!(!notifier.notify(RobotState::Cruising, &mut hw));
        assert_eq!(world.printed(), vec!["CRUISING...".to_string()]);
    }

    #[test]
    fn every_transition_renders_once() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut notifier = DisplayNotifier::new();

        for state in [
            RobotState::Cruising,
            RobotState::IrAvoiding,
            RobotState::IrAvoiding,
            RobotState::Cruising,
        ] {
            notifier.notify(state, &mut hw);
        }
        assert_eq!(
            world.printed(),
            vec!["CRUISING...", "IR AVOIDING...", "CRUISING..."]
        );
        assert_eq!(notifier.shown(), Some(RobotState::Cruising));
    }

    #[test]
    fn invalidate_forces_render() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut notifier = DisplayNotifier::new();

        notifier.notify(RobotState::Homing, &mut hw);
        notifier.invalidate();
        assert!(notifier.notify(RobotState::Homing, &mut hw));
    }

    #[test]
    fn blob_following_uses_short_label() {
        assert_eq!(state_label(RobotState::BlobFollowing), "FOLLOWING...");
        assert_eq!(state_label(RobotState::SonarAvoiding), "SONAR AVOIDING...");
    }
}
