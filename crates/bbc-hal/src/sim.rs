//! In-process simulated robot for tests and host runs without hardware.
//!
//! [`SimWorld`] owns one shared in-memory robot and hands out stub drivers
//! for every capability in this crate.  All stubs see the same state, so a
//! test can raise an IR flag through the world handle, run the loop, and then
//! inspect exactly which motor commands were issued.
//!
//! # Virtual clock
//!
//! Time only moves when something blocks: [`TimerService::delay`], a
//! [`MotorDriver::move_blocking`] call (steps / speed seconds), or an explicit
//! [`SimWorld::advance`].  Periodic alarms fire against this clock and
//! scheduled [`SimEvent`]s are applied as the clock passes them.  With
//! [`SimWorld::set_realtime`] every virtual delay also sleeps the host thread.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use bbc_hal::sim::{MotorCall, SimWorld};
//!
//! let world = SimWorld::new();
//! let mut hw = world.peripherals();
//!
//! hw.motors.set_acceleration(400, 400).unwrap();
//! hw.motors.run(200, 200).unwrap();
//! hw.timers.delay(Duration::from_millis(125));
//!
//! assert_eq!(world.now(), Duration::from_millis(125));
//! assert_eq!(world.motor_calls().len(), 2);
//! assert_eq!(world.motor_calls()[1], MotorCall::Run { left: 200, right: 200 });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use bbc_types::{BbcError, BlobReading, Side};
use tracing::trace;

use crate::audio::Audio;
use crate::blob::BlobTracker;
use crate::display::Display;
use crate::indicator::{Indicator, Led};
use crate::motor::{Brake, MotorDriver, StepMove, Wheels};
use crate::peripherals::{Peripherals, PeripheralsBuilder};
use crate::sensors::{AnalogSource, ProximitySource, RangingSource};
use crate::timer::{TimerHandle, TimerService, TimerTable};

// ────────────────────────────────────────────────────────────────────────────
// Recorded calls and scripted events
// ────────────────────────────────────────────────────────────────────────────

/// A motor command as received by the simulated driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCall {
    SetAcceleration { left: u16, right: u16 },
    Run { left: i16, right: i16 },
    Stop { which: Wheels, brake: Brake },
    Move { which: Wheels, left: StepMove, right: StepMove },
}

/// A display write as received by the simulated LCD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Print(String),
    PrintAt { row: u8, col: u8, text: String },
}

/// A change to the simulated environment, applied when the clock reaches it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Proximity(Side, bool),
    Analog { channel: u8, raw: u16 },
    Echo(u32),
    Blob(BlobReading),
}

/// How many times each input was actually sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleCounts {
    pub analog: usize,
    pub proximity: usize,
    pub pings: usize,
    pub blob: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SimState {
    now: Duration,
    realtime: bool,
    schedule: Vec<(Duration, SimEvent)>,

    left_ir: bool,
    right_ir: bool,
    analog: HashMap<u8, u16>,
    selected_channel: u8,
    echo_us: u32,
    blob_latest: BlobReading,
    blob_new: bool,
    blob_open_failure: Option<String>,
    motor_failure: Option<String>,

    timers: TimerTable,
    leds: HashMap<Led, bool>,
    motor_calls: Vec<MotorCall>,
    display_ops: Vec<DisplayOp>,
    cues: Vec<u8>,
    samples: SampleCounts,
}

impl SimState {
    fn apply(&mut self, event: SimEvent) {
        match event {
            SimEvent::Proximity(Side::Left, v) => self.left_ir = v,
            SimEvent::Proximity(Side::Right, v) => self.right_ir = v,
            SimEvent::Analog { channel, raw } => {
                self.analog.insert(channel, raw);
            }
            SimEvent::Echo(us) => self.echo_us = us,
            SimEvent::Blob(reading) => {
                self.blob_latest = reading;
                self.blob_new = true;
            }
        }
    }

    fn advance(&mut self, by: Duration) {
        let target = self.now + by;
        // Events are kept sorted by time; apply every one that is now due.
        let due = self.schedule.partition_point(|(at, _)| *at <= target);
        let events: Vec<(Duration, SimEvent)> = self.schedule.drain(..due).collect();
        for (at, event) in events {
            self.now = self.now.max(at);
            trace!(at_ms = at.as_millis() as u64, ?event, "Scheduled event applied");
            self.apply(event);
        }
        self.now = target;
        if self.realtime && !by.is_zero() {
            std::thread::sleep(by);
        }
    }
}

type Shared = Rc<RefCell<SimState>>;

// ────────────────────────────────────────────────────────────────────────────
// SimWorld handle
// ────────────────────────────────────────────────────────────────────────────

/// Handle to a simulated robot.  Clones share the same robot.
#[derive(Clone, Default)]
pub struct SimWorld {
    state: Shared,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-populated with a stub driver for every capability.
    /// Override individual drivers before calling `build`.
    pub fn builder(&self) -> PeripheralsBuilder {
        PeripheralsBuilder::new()
            .with_display(Box::new(SimDisplay(self.state.clone())))
            .with_indicator(Box::new(SimIndicator(self.state.clone())))
            .with_motors(Box::new(SimMotors(self.state.clone())))
            .with_analog(Box::new(SimAnalog(self.state.clone())))
            .with_proximity(Box::new(SimProximity(self.state.clone())))
            .with_ranging(Box::new(SimRanging(self.state.clone())))
            .with_blob_tracker(Box::new(SimBlobTracker(self.state.clone())))
            .with_timers(Box::new(SimTimers(self.state.clone())))
            .with_audio(Box::new(SimAudio(self.state.clone())))
    }

    /// A fully simulated [`Peripherals`] bundle.
    pub fn peripherals(&self) -> Peripherals {
        Peripherals {
            display: Box::new(SimDisplay(self.state.clone())),
            indicator: Box::new(SimIndicator(self.state.clone())),
            motors: Box::new(SimMotors(self.state.clone())),
            analog: Box::new(SimAnalog(self.state.clone())),
            proximity: Box::new(SimProximity(self.state.clone())),
            ranging: Box::new(SimRanging(self.state.clone())),
            blob: Box::new(SimBlobTracker(self.state.clone())),
            timers: Box::new(SimTimers(self.state.clone())),
            audio: Box::new(SimAudio(self.state.clone())),
        }
    }

    // ── Environment ───────────────────────────────────────────────────────

    /// Sleep the host thread for every virtual delay.
    pub fn set_realtime(&self, realtime: bool) {
        self.state.borrow_mut().realtime = realtime;
    }

    /// Apply `event` immediately.
    pub fn apply(&self, event: SimEvent) {
        self.state.borrow_mut().apply(event);
    }

    pub fn set_proximity(&self, side: Side, detected: bool) {
        self.apply(SimEvent::Proximity(side, detected));
    }

    pub fn set_analog(&self, channel: u8, raw: u16) {
        self.apply(SimEvent::Analog { channel, raw });
    }

    pub fn set_echo(&self, echo_us: u32) {
        self.apply(SimEvent::Echo(echo_us));
    }

    /// Raise the tracker's "new data" edge with `reading`.
    pub fn publish_blob(&self, reading: BlobReading) {
        self.apply(SimEvent::Blob(reading));
    }

    /// Apply `event` once the virtual clock reaches `at`.
    pub fn schedule(&self, at: Duration, event: SimEvent) {
        let mut state = self.state.borrow_mut();
        let idx = state.schedule.partition_point(|(t, _)| *t <= at);
        state.schedule.insert(idx, (at, event));
    }

    /// Make the next blob tracker `open` fail with `details`.
    pub fn fail_blob_open(&self, details: impl Into<String>) {
        self.state.borrow_mut().blob_open_failure = Some(details.into());
    }

    /// Make every motor command fail (`Some`) or succeed again (`None`).
    pub fn fail_motors(&self, details: Option<String>) {
        self.state.borrow_mut().motor_failure = details;
    }

    /// Move the virtual clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.state.borrow_mut().advance(by);
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    pub fn motor_calls(&self) -> Vec<MotorCall> {
        self.state.borrow().motor_calls.clone()
    }

    /// Return and forget the motor calls recorded so far.
    pub fn take_motor_calls(&self) -> Vec<MotorCall> {
        std::mem::take(&mut self.state.borrow_mut().motor_calls)
    }

    pub fn display_ops(&self) -> Vec<DisplayOp> {
        self.state.borrow().display_ops.clone()
    }

    /// The text of every `print` call, in order.
    pub fn printed(&self) -> Vec<String> {
        self.state
            .borrow()
            .display_ops
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Print(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn cues(&self) -> Vec<u8> {
        self.state.borrow().cues.clone()
    }

    pub fn led(&self, led: Led) -> bool {
        self.state.borrow().leds.get(&led).copied().unwrap_or(false)
    }

    pub fn samples(&self) -> SampleCounts {
        self.state.borrow().samples
    }

    pub fn blob_pending(&self) -> bool {
        self.state.borrow().blob_new
    }

    /// Number of periodic alarms armed so far.
    pub fn armed_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub drivers
// ────────────────────────────────────────────────────────────────────────────

struct SimDisplay(Shared);

impl Display for SimDisplay {
    fn clear(&mut self) {
        self.0.borrow_mut().display_ops.push(DisplayOp::Clear);
    }

    fn print(&mut self, text: &str) {
        self.0
            .borrow_mut()
            .display_ops
            .push(DisplayOp::Print(text.to_string()));
    }

    fn print_at(&mut self, row: u8, col: u8, text: &str) {
        self.0.borrow_mut().display_ops.push(DisplayOp::PrintAt {
            row,
            col,
            text: text.to_string(),
        });
    }
}

struct SimIndicator(Shared);

impl Indicator for SimIndicator {
    fn toggle(&mut self, led: Led) {
        let mut state = self.0.borrow_mut();
        let lit = state.leds.entry(led).or_insert(false);
        *lit = !*lit;
    }

    fn set(&mut self, led: Led) {
        self.0.borrow_mut().leds.insert(led, true);
    }

    fn clear(&mut self, led: Led) {
        self.0.borrow_mut().leds.insert(led, false);
    }

    fn is_lit(&self, led: Led) -> bool {
        self.0.borrow().leds.get(&led).copied().unwrap_or(false)
    }
}

struct SimMotors(Shared);

impl SimMotors {
    fn record(&mut self, call: MotorCall) -> Result<(), BbcError> {
        let mut state = self.0.borrow_mut();
        if let Some(details) = &state.motor_failure {
            return Err(BbcError::fault("motors", details.clone()));
        }
        state.motor_calls.push(call);
        Ok(())
    }
}

impl MotorDriver for SimMotors {
    fn set_acceleration(&mut self, left: u16, right: u16) -> Result<(), BbcError> {
        self.record(MotorCall::SetAcceleration { left, right })
    }

    fn run(&mut self, speed_left: i16, speed_right: i16) -> Result<(), BbcError> {
        self.record(MotorCall::Run {
            left: speed_left,
            right: speed_right,
        })
    }

    fn stop(&mut self, which: Wheels, brake: Brake) -> Result<(), BbcError> {
        self.record(MotorCall::Stop { which, brake })
    }

    fn move_blocking(
        &mut self,
        which: Wheels,
        left: StepMove,
        right: StepMove,
    ) -> Result<(), BbcError> {
        self.record(MotorCall::Move { which, left, right })?;
        let secs = match which {
            Wheels::Left => left.nominal_secs(),
            Wheels::Right => right.nominal_secs(),
            Wheels::Both => left.nominal_secs().max(right.nominal_secs()),
        };
        self.0.borrow_mut().advance(Duration::from_secs_f64(secs));
        Ok(())
    }
}

struct SimAnalog(Shared);

impl AnalogSource for SimAnalog {
    fn select_channel(&mut self, channel: u8) {
        self.0.borrow_mut().selected_channel = channel;
    }

    fn sample(&mut self) -> Result<u16, BbcError> {
        let mut state = self.0.borrow_mut();
        state.samples.analog += 1;
        let channel = state.selected_channel;
        Ok(state.analog.get(&channel).copied().unwrap_or(0))
    }
}

struct SimProximity(Shared);

impl ProximitySource for SimProximity {
    fn read(&mut self, side: Side) -> Result<bool, BbcError> {
        let mut state = self.0.borrow_mut();
        state.samples.proximity += 1;
        Ok(match side {
            Side::Left => state.left_ir,
            Side::Right => state.right_ir,
        })
    }
}

struct SimRanging(Shared);

impl RangingSource for SimRanging {
    fn ping(&mut self) -> Result<u32, BbcError> {
        let mut state = self.0.borrow_mut();
        state.samples.pings += 1;
        Ok(state.echo_us)
    }
}

struct SimBlobTracker(Shared);

impl BlobTracker for SimBlobTracker {
    fn open(&mut self) -> Result<(), BbcError> {
        match self.0.borrow_mut().blob_open_failure.take() {
            Some(details) => Err(BbcError::CollaboratorInit {
                component: "blob_tracker".to_string(),
                details,
            }),
            None => Ok(()),
        }
    }

    fn has_new_data(&self) -> bool {
        self.0.borrow().blob_new
    }

    fn consume_data(&mut self) -> BlobReading {
        let mut state = self.0.borrow_mut();
        state.samples.blob += 1;
        state.blob_latest
    }

    fn mark_processed(&mut self) {
        self.0.borrow_mut().blob_new = false;
    }
}

struct SimTimers(Shared);

impl TimerService for SimTimers {
    fn arm_periodic(&mut self, period: Duration) -> TimerHandle {
        let mut state = self.0.borrow_mut();
        let now = state.now;
        state.timers.arm(now, period)
    }

    fn has_fired(&self, handle: TimerHandle) -> bool {
        let state = self.0.borrow();
        state.timers.fired(state.now, handle)
    }

    fn rearm(&mut self, handle: TimerHandle) {
        let mut state = self.0.borrow_mut();
        let now = state.now;
        state.timers.rearm(now, handle);
    }

    fn delay(&mut self, duration: Duration) {
        self.0.borrow_mut().advance(duration);
    }
}

struct SimAudio(Shared);

impl Audio for SimAudio {
    fn play_sequence(&mut self, id: u8) {
        self.0.borrow_mut().cues.push(id);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
