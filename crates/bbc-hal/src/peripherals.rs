//! [`Peripherals`] – the collaborator bundle lent to every loop participant.
//!
//! The bundle is built once at process start with [`PeripheralsBuilder`] and
//! then passed by `&mut` into each sensing task, behavior, the change gate,
//! and the display notifier.  There is no global lookup: whoever holds the
//! bundle owns the hardware for the duration of the call.

use bbc_types::BbcError;

use crate::audio::Audio;
use crate::blob::BlobTracker;
use crate::display::Display;
use crate::indicator::Indicator;
use crate::motor::MotorDriver;
use crate::sensors::{AnalogSource, ProximitySource, RangingSource};
use crate::timer::TimerService;

/// Every external capability the arbitration core consumes.
pub struct Peripherals {
    pub display: Box<dyn Display>,
    pub indicator: Box<dyn Indicator>,
    pub motors: Box<dyn MotorDriver>,
    pub analog: Box<dyn AnalogSource>,
    pub proximity: Box<dyn ProximitySource>,
    pub ranging: Box<dyn RangingSource>,
    pub blob: Box<dyn BlobTracker>,
    pub timers: Box<dyn TimerService>,
    pub audio: Box<dyn Audio>,
}

/// Builder for [`Peripherals`].
///
/// Register one driver per capability with the `with_*` methods, then call
/// [`build`][Self::build].  Registering a capability twice replaces the
/// earlier driver.
#[derive(Default)]
pub struct PeripheralsBuilder {
    display: Option<Box<dyn Display>>,
    indicator: Option<Box<dyn Indicator>>,
    motors: Option<Box<dyn MotorDriver>>,
    analog: Option<Box<dyn AnalogSource>>,
    proximity: Option<Box<dyn ProximitySource>>,
    ranging: Option<Box<dyn RangingSource>>,
    blob: Option<Box<dyn BlobTracker>>,
    timers: Option<Box<dyn TimerService>>,
    audio: Option<Box<dyn Audio>>,
}

impl PeripheralsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(mut self, display: Box<dyn Display>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_indicator(mut self, indicator: Box<dyn Indicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn with_motors(mut self, motors: Box<dyn MotorDriver>) -> Self {
        self.motors = Some(motors);
        self
    }

    pub fn with_analog(mut self, analog: Box<dyn AnalogSource>) -> Self {
        self.analog = Some(analog);
        self
    }

    pub fn with_proximity(mut self, proximity: Box<dyn ProximitySource>) -> Self {
        self.proximity = Some(proximity);
        self
    }

    pub fn with_ranging(mut self, ranging: Box<dyn RangingSource>) -> Self {
        self.ranging = Some(ranging);
        self
    }

    pub fn with_blob_tracker(mut self, blob: Box<dyn BlobTracker>) -> Self {
        self.blob = Some(blob);
        self
    }

    pub fn with_timers(mut self, timers: Box<dyn TimerService>) -> Self {
        self.timers = Some(timers);
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn Audio>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Consume the builder.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::MissingDriver`] naming the first capability that
    /// was never registered.
    pub fn build(self) -> Result<Peripherals, BbcError> {
        Ok(Peripherals {
            display: require(self.display, "display")?,
            indicator: require(self.indicator, "indicator")?,
            motors: require(self.motors, "motors")?,
            analog: require(self.analog, "analog")?,
            proximity: require(self.proximity, "proximity")?,
            ranging: require(self.ranging, "ranging")?,
            blob: require(self.blob, "blob_tracker")?,
            timers: require(self.timers, "timers")?,
            audio: require(self.audio, "audio")?,
        })
    }
}

fn require<T>(slot: Option<T>, name: &str) -> Result<T, BbcError> {
    slot.ok_or_else(|| BbcError::MissingDriver(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Display;
    use crate::sim::{DisplayOp, SimWorld};

    struct CountingDisplay {
        writes: usize,
    }

    impl Display for CountingDisplay {
        fn clear(&mut self) {}
        fn print(&mut self, _text: &str) {
            self.writes += 1;
        }
        fn print_at(&mut self, _row: u8, _col: u8, _text: &str) {
            self.writes += 1;
        }
    }

    #[test]
    fn empty_builder_reports_first_missing_driver() {
        let result = PeripheralsBuilder::new().build();
        assert!(matches!(result, Err(BbcError::MissingDriver(ref name)) if name == "display"));
    }

    #[test]
    fn partially_filled_builder_names_the_gap() {
        let world = SimWorld::new();
        let result = world
            .builder()
            .with_display(Box::new(CountingDisplay { writes: 0 }))
            .build();
        assert!(result.is_ok());

        let result = PeripheralsBuilder::new()
            .with_display(Box::new(CountingDisplay { writes: 0 }))
            .build();
        assert!(matches!(result, Err(BbcError::MissingDriver(ref name)) if name == "indicator"));
    }

    #[test]
    fn re_registering_replaces_driver() {
        let world = SimWorld::new();
        let mut hw = world
            .builder()
            .with_display(Box::new(CountingDisplay { writes: 0 }))
            .build()
            .unwrap();

        hw.display.print("HOMING...");
        // The replacement display received the write, the simulated one did not.
        assert!(!world.display_ops().contains(&DisplayOp::Print("HOMING...".into())));
        assert!(world.display_ops().is_empty());
    }
}
