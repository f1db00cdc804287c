//! Sensor source traits and the fixed conversions the core applies to raw
//! samples.

use bbc_types::{BbcError, Side};

/// ADC reference voltage (AVCC).
pub const ADC_REFERENCE_VOLTS: f32 = 5.0;

/// Full-scale count of the 10-bit ADC.
pub const ADC_COUNTS: f32 = 1024.0;

/// Speed of sound in air at room temperature, centimeters per microsecond.
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Convert a raw 10-bit ADC sample to volts.
pub fn adc_to_volts(raw: u16) -> f32 {
    f32::from(raw) * ADC_REFERENCE_VOLTS / ADC_COUNTS
}

/// Convert a round-trip echo time in microseconds to a one-way distance in
/// centimeters.  A zero echo maps to `0.0`, i.e. "no valid reading".
pub fn echo_to_cm(echo_us: u32) -> f32 {
    echo_us as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0
}

/// A multiplexed analog-to-digital converter.
pub trait AnalogSource {
    /// Route `channel` to the converter for the next [`sample`][Self::sample].
    fn select_channel(&mut self, channel: u8);

    /// Convert the selected channel and return the raw count.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::HardwareFault`] if the conversion failed.
    fn sample(&mut self) -> Result<u16, BbcError>;

    /// Select `channel`, sample it, and convert the result to volts.
    ///
    /// # Errors
    ///
    /// Propagates the failure from [`sample`][Self::sample].
    fn read_volts(&mut self, channel: u8) -> Result<f32, BbcError> {
        self.select_channel(channel);
        self.sample().map(adc_to_volts)
    }
}

/// The pair of digital IR proximity detectors on the front bumper.
pub trait ProximitySource {
    /// Return `true` if the detector on `side` sees an obstacle.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::HardwareFault`] if the detector could not be read.
    fn read(&mut self, side: Side) -> Result<bool, BbcError>;
}

/// An ultrasonic range finder.
pub trait RangingSource {
    /// Fire one ping and return the echo round-trip time in microseconds
    /// (`0` when nothing answered).
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::HardwareFault`] if the ranging module failed.
    fn ping(&mut self) -> Result<u32, BbcError>;
}
