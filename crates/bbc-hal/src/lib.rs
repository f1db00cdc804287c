//! `bbc-hal` – Collaborator capabilities
//!
//! The arbitration core never talks to vendor drivers directly.  Everything it
//! needs from the outside world is expressed as a narrow trait in this crate,
//! and the traits are bundled into a single [`Peripherals`] value that is
//! created once at process start and lent to every sensing task, behavior,
//! and the change gate.
//!
//! # Modules
//!
//! - [`display`] – character LCD ([`Display`]).
//! - [`indicator`] – debug LEDs ([`Indicator`]).
//! - [`motor`] – twin stepper driver ([`MotorDriver`]) including the blocking
//!   move primitive used by ballistic behaviors.
//! - [`sensors`] – analog, proximity, and ranging sources plus the raw→unit
//!   conversions the core applies to their samples.
//! - [`blob`] – color blob tracker ([`BlobTracker`]).
//! - [`timer`] – periodic timers and bounded blocking delays ([`TimerService`]).
//! - [`audio`] – fire-and-forget cue playback ([`Audio`]).
//! - [`peripherals`] – the [`Peripherals`] bundle and its builder.
//! - [`pd`] – [`PdController`], the one-step PD law shared by wall and line
//!   following.
//! - [`sim`] – [`SimWorld`][sim::SimWorld], an in-process robot implementing
//!   every capability against a virtual clock.

pub mod audio;
pub mod blob;
pub mod display;
pub mod indicator;
pub mod motor;
pub mod pd;
pub mod peripherals;
pub mod sensors;
pub mod sim;
pub mod timer;

pub use audio::Audio;
pub use blob::BlobTracker;
pub use display::Display;
pub use indicator::{Indicator, Led};
pub use motor::{Brake, Direction, MotorDriver, StepMove, Wheels};
pub use pd::PdController;
pub use peripherals::{Peripherals, PeripheralsBuilder};
pub use sensors::{AnalogSource, ProximitySource, RangingSource, adc_to_volts, echo_to_cm};
pub use timer::{TimerHandle, TimerService, TimerTable};
