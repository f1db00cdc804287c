//! [`Arbiter`] – the fixed-priority arbitration loop.
//!
//! Each [`tick`][Arbiter::tick] runs, in this order:
//!
//! 1. **Sense** – poll every [`SensingTask`]; each samples only when its own
//!    period has elapsed.
//! 2. **Arbitrate** – evaluate every [`Behavior`] in ascending priority.  The
//!    behaviors overwrite the shared [`Action`], so the last one that writes
//!    wins outright.  A behavior about to block the loop gets its state shown
//!    first.
//! 3. **Act** – hand the action to the [`ChangeGate`], which only reaches the
//!    motors when something changed.
//! 4. **Display** – let the [`DisplayNotifier`] render the state on a
//!    transition.
//! 5. **Pace** – block for the configured loop delay, if any.
//!
//! There is no preemption: a ballistic behavior holds the loop until its
//! maneuver finishes.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use bbc_hal::sim::SimWorld;
//! use bbc_runtime::arbiter::Arbiter;
//! use bbc_runtime::behaviors::Cruise;
//! use bbc_runtime::config::CruiseConfig;
//! use bbc_types::RobotState;
//!
//! let world = SimWorld::new();
//! let mut hw = world.peripherals();
//! let mut arbiter = Arbiter::builder()
//!     .startup_delay(Duration::ZERO)
//!     .behavior(Box::new(Cruise::new(&CruiseConfig::default())))
//!     .build();
//!
//! arbiter.start(&mut hw).unwrap();
//! arbiter.tick(&mut hw);
//! assert_eq!(arbiter.action().state, RobotState::Cruising);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bbc_hal::{Display, Peripherals};
use bbc_kernel::{ChangeGate, DisplayNotifier};
use bbc_types::{Action, BbcError, SensorFrame};
use tracing::{error, info, instrument};

use crate::behaviors::Behavior;
use crate::sensing::SensingTask;

const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(3);

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Composes an [`Arbiter`].  Sensing tasks run in registration order;
/// behaviors are registered lowest priority first.
pub struct ArbiterBuilder {
    sensing: Vec<Box<dyn SensingTask>>,
    behaviors: Vec<Box<dyn Behavior>>,
    startup_delay: Duration,
    loop_delay: Duration,
}

impl Default for ArbiterBuilder {
    fn default() -> Self {
        Self {
            sensing: Vec::new(),
            behaviors: Vec::new(),
            startup_delay: DEFAULT_STARTUP_DELAY,
            loop_delay: Duration::ZERO,
        }
    }
}

impl ArbiterBuilder {
    pub fn sensing(mut self, task: Box<dyn SensingTask>) -> Self {
        self.sensing.push(task);
        self
    }

    /// Append a behavior above every behavior registered so far.
    pub fn behavior(mut self, behavior: Box<dyn Behavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn loop_delay(mut self, delay: Duration) -> Self {
        self.loop_delay = delay;
        self
    }

    pub fn build(self) -> Arbiter {
        Arbiter {
            sensing: self.sensing,
            behaviors: self.behaviors,
            gate: ChangeGate::new(),
            notifier: DisplayNotifier::new(),
            action: Action::default(),
            frame: SensorFrame::default(),
            startup_delay: self.startup_delay,
            loop_delay: self.loop_delay,
            iterations: 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Arbiter
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the shared [`Action`] and [`SensorFrame`] together with every
/// participant of the loop.
pub struct Arbiter {
    sensing: Vec<Box<dyn SensingTask>>,
    behaviors: Vec<Box<dyn Behavior>>,
    gate: ChangeGate,
    notifier: DisplayNotifier,
    action: Action,
    frame: SensorFrame,
    startup_delay: Duration,
    loop_delay: Duration,
    iterations: u64,
}

impl Arbiter {
    pub fn builder() -> ArbiterBuilder {
        ArbiterBuilder::default()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn frame(&self) -> &SensorFrame {
        &self.frame
    }

    pub fn loop_delay(&self) -> Duration {
        self.loop_delay
    }

    /// Completed iterations since construction.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn sensing_names(&self) -> Vec<&'static str> {
        self.sensing.iter().map(|t| t.name()).collect()
    }

    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    /// Bring the robot up: reset the action, open the collaborators the
    /// sensing tasks need, announce the start, wait out the startup delay,
    /// capture baselines, and clear the display.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::CollaboratorInit`] when a required collaborator
    /// cannot be opened.  The caller must not run the loop afterwards.
    pub fn start(&mut self, hw: &mut Peripherals) -> Result<(), BbcError> {
        self.action.reset();
        for task in &mut self.sensing {
            task.open(hw)?;
        }

        hw.display.print("Starting...");
        info!(
            sensing = ?self.sensing_names(),
            behaviors = ?self.behavior_names(),
            startup_delay_ms = self.startup_delay.as_millis() as u64,
            "Arbiter starting"
        );
        hw.timers.delay(self.startup_delay);

        for task in &mut self.sensing {
            task.calibrate(&mut self.frame, hw);
        }
        hw.display.clear();
        Ok(())
    }

    /// Run one sense → arbitrate → act → display iteration.
    #[instrument(level = "trace", skip_all, fields(iteration = self.iterations))]
    pub fn tick(&mut self, hw: &mut Peripherals) {
        for task in &mut self.sensing {
            task.sense(&mut self.frame, hw);
        }
        for behavior in &mut self.behaviors {
            if let Some(state) = behavior.announces(&self.frame) {
                self.notifier.notify(state, hw);
            }
            behavior.evaluate(&mut self.action, &self.frame, hw);
        }
        self.gate.apply(&self.action, hw);
        self.notifier.notify(self.action.state, hw);

        if !self.loop_delay.is_zero() {
            hw.timers.delay(self.loop_delay);
        }
        self.iterations += 1;
    }

    /// Tick until `stop` is raised or `limit` iterations have run, calling
    /// `after_tick` once after every iteration.  Returns the number of
    /// iterations performed by this call.
    pub fn run_until(
        &mut self,
        hw: &mut Peripherals,
        stop: &AtomicBool,
        limit: Option<u64>,
        mut after_tick: impl FnMut(),
    ) -> u64 {
        let mut count = 0;
        while !stop.load(Ordering::Acquire) && limit.is_none_or(|max| count < max) {
            self.tick(hw);
            after_tick();
            count += 1;
        }
        info!(iterations = count, "Arbiter loop exited");
        count
    }
}

/// Put a fatal startup failure on the display.  After this the caller parks
/// forever; nothing else may run.
pub fn report_fatal(display: &mut dyn Display, err: &BbcError) {
    let component = match err {
        BbcError::CollaboratorInit { component, .. } | BbcError::HardwareFault { component, .. } => {
            component.as_str()
        }
        BbcError::MissingDriver(name) => name.as_str(),
        BbcError::Config(_) => "config",
    };
    error!(error = %err, "Fatal error; halting");
    display.clear();
    display.print(&format!("FATAL: {component} failed!"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
