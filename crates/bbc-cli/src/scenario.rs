//! Scripted environment changes for host runs.
//!
//! A scenario is a TOML file of `[[event]]` tables, each applied to the
//! simulated robot once its virtual clock reaches `at_ms`:
//!
//! ```toml
//! [[event]]
//! at_ms = 500
//! kind = "proximity"
//! side = "left"
//! detected = true
//!
//! [[event]]
//! at_ms = 1200
//! kind = "sonar"
//! distance_cm = 40.0
//!
//! [[event]]
//! at_ms = 2000
//! kind = "blob"
//! signature = 2
//! ```
//!
//! Analog channels take volts and sonar contacts take centimetres; both are
//! converted back into the raw readings the drivers would report.

use std::fs;
use std::path::Path;
use std::time::Duration;

use bbc_hal::sensors::{ADC_COUNTS, ADC_REFERENCE_VOLTS, SPEED_OF_SOUND_CM_PER_US};
use bbc_hal::sim::SimEvent;
use bbc_types::{BbcError, BlobReading, Side};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    event: Vec<EventEntry>,
}

#[derive(Debug, Deserialize)]
struct EventEntry {
    at_ms: u64,
    #[serde(flatten)]
    kind: EventKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum EventKind {
    Proximity {
        side: Side,
        detected: bool,
    },
    Analog {
        channel: u8,
        volts: f32,
    },
    Echo {
        echo_us: u32,
    },
    Sonar {
        distance_cm: f32,
    },
    Blob {
        signature: u8,
        #[serde(default)]
        x: u16,
        #[serde(default)]
        y: u16,
        #[serde(default)]
        width: u16,
        #[serde(default)]
        height: u16,
    },
}

impl EventKind {
    fn into_event(self) -> SimEvent {
        match self {
            EventKind::Proximity { side, detected } => SimEvent::Proximity(side, detected),
            EventKind::Analog { channel, volts } => SimEvent::Analog {
                channel,
                raw: volts_to_raw(volts),
            },
            EventKind::Echo { echo_us } => SimEvent::Echo(echo_us),
            EventKind::Sonar { distance_cm } => SimEvent::Echo(cm_to_echo(distance_cm)),
            EventKind::Blob {
                signature,
                x,
                y,
                width,
                height,
            } => SimEvent::Blob(BlobReading {
                x,
                y,
                width,
                height,
                signature,
            }),
        }
    }
}

fn volts_to_raw(volts: f32) -> u16 {
    (volts / ADC_REFERENCE_VOLTS * ADC_COUNTS)
        .round()
        .clamp(0.0, ADC_COUNTS - 1.0) as u16
}

fn cm_to_echo(cm: f32) -> u32 {
    (cm.max(0.0) * 2.0 / SPEED_OF_SOUND_CM_PER_US).round() as u32
}

/// Parse a scenario document into `(time, event)` pairs.
pub fn parse_scenario(raw: &str) -> Result<Vec<(Duration, SimEvent)>, BbcError> {
    let file: ScenarioFile = toml::from_str(raw)
        .map_err(|e| BbcError::Config(format!("Failed to parse scenario: {e}")))?;
    Ok(file
        .event
        .into_iter()
        .map(|entry| (Duration::from_millis(entry.at_ms), entry.kind.into_event()))
        .collect())
}

/// Read and parse the scenario at `path`.
pub fn load_scenario(path: &Path) -> Result<Vec<(Duration, SimEvent)>, BbcError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        BbcError::Config(format!("Failed to read scenario at {}: {}", path.display(), e))
    })?;
    parse_scenario(&raw)
}
