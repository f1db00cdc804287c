//! Sensing tasks – one per sensor channel.
//!
//! Each task owns an [`IntervalTimer`] and the [`SensorFrame`] fields for its
//! channel.  [`SensingTask::sense`] is called once per loop iteration and
//! only samples hardware when the task's period has elapsed; the very first
//! call just arms the timer.  A failed read is logged and the stale value is
//! kept.

use std::time::Duration;

use bbc_hal::{Led, Peripherals, echo_to_cm};
use bbc_kernel::IntervalTimer;
use bbc_types::{BbcError, SensorFrame, Side};
use tracing::{info, trace, warn};

/// A rate-limited sampler that owns a subset of the [`SensorFrame`].
pub trait SensingTask {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn interval_mut(&mut self) -> &mut IntervalTimer;

    /// Take one sample and write it into `frame`.
    fn sample(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals);

    /// Open any collaborator the task depends on.  Called once at startup.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::CollaboratorInit`] when a required collaborator
    /// cannot be opened.
    fn open(&mut self, _hw: &mut Peripherals) -> Result<(), BbcError> {
        Ok(())
    }

    /// Capture baselines once at startup, after the startup delay.
    fn calibrate(&mut self, _frame: &mut SensorFrame, _hw: &mut Peripherals) {}

    /// Sample if the period has elapsed; otherwise return immediately.
    fn sense(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        if self.interval_mut().poll(hw.timers.as_mut()) {
            self.sample(frame, hw);
        }
    }
}

fn keep_stale<T>(task: &str, result: Result<T, BbcError>) -> Option<T> {
    result
        .map_err(|e| warn!(task, error = %e, "Sensor read failed; keeping previous value"))
        .ok()
}

// ────────────────────────────────────────────────────────────────────────────
// IR proximity
// ────────────────────────────────────────────────────────────────────────────

pub struct IrSensing {
    interval: IntervalTimer,
}

impl IrSensing {
    pub fn new(period: Duration) -> Self {
        Self {
            interval: IntervalTimer::new(period),
        }
    }
}

impl SensingTask for IrSensing {
    fn name(&self) -> &'static str {
        "ir"
    }

    fn interval_mut(&mut self) -> &mut IntervalTimer {
        &mut self.interval
    }

    fn sample(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        hw.indicator.toggle(Led::Green);
        if let Some(v) = keep_stale("ir", hw.proximity.read(Side::Left)) {
            frame.left_ir = v;
        }
        if let Some(v) = keep_stale("ir", hw.proximity.read(Side::Right)) {
            frame.right_ir = v;
        }
        trace!(left = frame.left_ir, right = frame.right_ir, "IR sample");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Photoresistors
// ────────────────────────────────────────────────────────────────────────────

pub struct PhotoSensing {
    interval: IntervalTimer,
    left_channel: u8,
    right_channel: u8,
}

impl PhotoSensing {
    pub fn new(period: Duration, left_channel: u8, right_channel: u8) -> Self {
        Self {
            interval: IntervalTimer::new(period),
            left_channel,
            right_channel,
        }
    }
}

impl SensingTask for PhotoSensing {
    fn name(&self) -> &'static str {
        "photo"
    }

    fn interval_mut(&mut self) -> &mut IntervalTimer {
        &mut self.interval
    }

    fn sample(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        hw.indicator.toggle(Led::Red);
        if let Some(v) = keep_stale("photo", hw.analog.read_volts(self.left_channel)) {
            frame.left_photo_voltage = v;
        }
        if let Some(v) = keep_stale("photo", hw.analog.read_volts(self.right_channel)) {
            frame.right_photo_voltage = v;
        }
        trace!(
            left = frame.left_photo_voltage,
            right = frame.right_photo_voltage,
            "Photo sample"
        );
    }

    fn calibrate(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        hw.indicator.toggle(Led::Red);
        if let Some(v) = keep_stale("photo", hw.analog.read_volts(self.left_channel)) {
            frame.left_photo_ambient = v;
        }
        if let Some(v) = keep_stale("photo", hw.analog.read_volts(self.right_channel)) {
            frame.right_photo_ambient = v;
        }
        info!(
            left = frame.left_photo_ambient,
            right = frame.right_photo_ambient,
            "Ambient light baseline captured"
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sonar
// ────────────────────────────────────────────────────────────────────────────

pub struct SonarSensing {
    interval: IntervalTimer,
}

impl SonarSensing {
    pub fn new(period: Duration) -> Self {
        Self {
            interval: IntervalTimer::new(period),
        }
    }
}

impl SensingTask for SonarSensing {
    fn name(&self) -> &'static str {
        "sonar"
    }

    fn interval_mut(&mut self) -> &mut IntervalTimer {
        &mut self.interval
    }

    fn sample(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        if let Some(echo_us) = keep_stale("sonar", hw.ranging.ping()) {
            frame.sonar_distance_cm = echo_to_cm(echo_us);
            trace!(echo_us, distance_cm = frame.sonar_distance_cm, "Sonar sample");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line reflectance
// ────────────────────────────────────────────────────────────────────────────

pub struct LineSensing {
    interval: IntervalTimer,
    left_channel: u8,
    right_channel: u8,
}

impl LineSensing {
    pub fn new(period: Duration, left_channel: u8, right_channel: u8) -> Self {
        Self {
            interval: IntervalTimer::new(period),
            left_channel,
            right_channel,
        }
    }
}

impl SensingTask for LineSensing {
    fn name(&self) -> &'static str {
        "line"
    }

    fn interval_mut(&mut self) -> &mut IntervalTimer {
        &mut self.interval
    }

    fn sample(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        hw.indicator.toggle(Led::Red);
        if let Some(v) = keep_stale("line", hw.analog.read_volts(self.left_channel)) {
            frame.left_line_voltage = v;
        }
        if let Some(v) = keep_stale("line", hw.analog.read_volts(self.right_channel)) {
            frame.right_line_voltage = v;
        }
        trace!(
            left = frame.left_line_voltage,
            right = frame.right_line_voltage,
            "Line sample"
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Blob tracker
// ────────────────────────────────────────────────────────────────────────────

/// Copies the tracker's latest detection into the frame and raises
/// [`SensorFrame::blob_ready`] for the iteration that copied it.  The
/// tracker's own edge is only lowered by the consuming behavior.
///
/// `blob_ready` is cleared on every poll that does not sample, so a slow
/// interval can delay a detection but never replay an older one.
pub struct BlobSensing {
    interval: IntervalTimer,
}

impl BlobSensing {
    pub fn new(period: Duration) -> Self {
        Self {
            interval: IntervalTimer::new(period),
        }
    }
}

impl SensingTask for BlobSensing {
    fn name(&self) -> &'static str {
        "blob"
    }

    fn interval_mut(&mut self) -> &mut IntervalTimer {
        &mut self.interval
    }

    fn open(&mut self, hw: &mut Peripherals) -> Result<(), BbcError> {
        hw.blob.open()
    }

    fn sense(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        if self.interval.poll(hw.timers.as_mut()) {
            self.sample(frame, hw);
        } else {
            frame.blob_ready = false;
        }
    }

    fn sample(&mut self, frame: &mut SensorFrame, hw: &mut Peripherals) {
        if hw.blob.has_new_data() {
            frame.blob = hw.blob.consume_data();
            frame.blob_ready = true;
            trace!(blob = ?frame.blob, "Blob sample");
        } else {
            frame.blob_ready = false;
        }
    }
}
