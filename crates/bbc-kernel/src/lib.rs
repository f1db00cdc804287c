//! `bbc-kernel` – Actuation & Pacing
//!
//! The pieces of the control loop that sit between the behaviors and the
//! hardware.  They do not decide anything; they enforce when the decision is
//! allowed to reach a collaborator.
//!
//! # Modules
//!
//! - [`change_gate`] – [`ChangeGate`][change_gate::ChangeGate]:
//!   the single point where the winning [`Action`][bbc_types::Action] is
//!   forwarded to the motor driver, and only when it differs from the last
//!   one successfully applied.
//! - [`display_notifier`] – [`DisplayNotifier`][display_notifier::DisplayNotifier]:
//!   renders the robot state label on the LCD once per state transition.
//! - [`interval`] – [`IntervalTimer`][interval::IntervalTimer]:
//!   the lazily armed periodic alarm each sensing task polls to decide
//!   whether it is due.

pub mod change_gate;
pub mod display_notifier;
pub mod interval;

pub use change_gate::ChangeGate;
pub use display_notifier::{DisplayNotifier, state_label};
pub use interval::IntervalTimer;
