//! `bbc-runtime` – The Arbitration Engine
//!
//! Sensing tasks, behaviors, and the loop that runs them in fixed priority
//! order against a [`Peripherals`][bbc_hal::Peripherals] bundle.
//!
//! # Modules
//!
//! - [`arbiter`] – [`Arbiter`][arbiter::Arbiter]: the sense → arbitrate →
//!   act → display loop, its builder, startup sequence, and the fatal-error
//!   report.
//! - [`sensing`] – [`SensingTask`][sensing::SensingTask] and one rate-limited
//!   task per sensor channel (IR, photo, sonar, line, blob).
//! - [`behaviors`] – [`Behavior`][behaviors::Behavior] and the control laws:
//!   cruise, light-follow, sonar-avoid, wall-follow, line-follow, the
//!   ballistic IR escape, and blob-follow.
//! - [`profile`] – [`Profile`][profile::Profile]: which tasks and behaviors a
//!   deployment composes, and [`build_arbiter`][profile::build_arbiter].
//! - [`config`] – [`ArbiterConfig`][config::ArbiterConfig]: serde-backed
//!   tuning for every task and behavior.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber.

pub mod arbiter;
pub mod behaviors;
pub mod config;
pub mod profile;
pub mod sensing;
pub mod telemetry;

pub use arbiter::{Arbiter, ArbiterBuilder, report_fatal};
pub use behaviors::Behavior;
pub use config::ArbiterConfig;
pub use profile::{Profile, UnknownProfile, build_arbiter};
pub use sensing::SensingTask;
pub use telemetry::init_tracing;
